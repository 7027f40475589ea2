//! Paginated listing over a filtered `FROM ... WHERE` clause

use sqlx::{postgres::PgRow, FromRow, Pool, Postgres, QueryBuilder};

use crate::{error::AppResult, filter::FilterQuery, models::PageParams};

/// A list query: selected columns, source relation, optional parent scope and filters.
/// The count and the page select share the same `FROM ... WHERE`.
pub struct Listing<'q> {
    columns: &'static str,
    from: &'static str,
    scope: Option<(&'static str, i64)>,
    filter: &'q FilterQuery,
}

impl<'q> Listing<'q> {
    pub fn new(columns: &'static str, from: &'static str, filter: &'q FilterQuery) -> Self {
        Self {
            columns,
            from,
            scope: None,
            filter,
        }
    }

    /// Restrict rows to `column = id`, e.g. books of one publisher
    pub fn scoped(mut self, column: &'static str, id: i64) -> Self {
        self.scope = Some((column, id));
        self
    }

    fn push_from_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" FROM ").push(self.from);
        if let Some((column, id)) = self.scope {
            qb.push(" WHERE ").push(column).push(" = ").push_bind(id);
        }
        self.filter.push_predicates(qb, self.scope.is_some());
    }

    /// Fetch one page of rows plus the total number of matching rows
    pub async fn fetch_page<T>(
        &self,
        pool: &Pool<Postgres>,
        params: PageParams,
    ) -> AppResult<(Vec<T>, i64)>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        self.push_from_where(&mut count);
        let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT ");
        select.push(self.columns);
        self.push_from_where(&mut select);
        self.filter.push_order_by(&mut select);
        select
            .push(" LIMIT ")
            .push_bind(params.size)
            .push(" OFFSET ")
            .push_bind(params.offset());

        tracing::debug!(sql = select.sql(), "List query");

        let rows = select.build_query_as::<T>().fetch_all(pool).await?;
        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{parse, BOOK_FILTER};

    #[test]
    fn test_scoped_listing_sql() {
        let pairs = vec![("year__gte".to_string(), "1994".to_string())];
        let filter = parse(&BOOK_FILTER, &pairs).unwrap();
        let listing = Listing::new(
            "books.id",
            "books JOIN author_book_association aba ON aba.book_id = books.id",
            &filter,
        )
        .scoped("aba.author_id", 4);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        listing.push_from_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM books JOIN author_book_association aba ON aba.book_id = books.id \
             WHERE aba.author_id = $1 AND books.year >= $2"
        );
    }
}
