//! Batched relation loading and association integrity checks.
//!
//! Loaders take any Postgres executor so they run either on the pool or
//! inside an open transaction.

use std::collections::{BTreeSet, HashMap};

use sqlx::{PgConnection, PgExecutor};

use crate::{
    error::{AppError, AppResult},
    models::{
        association::{AuthorBookRow, BookAuthorRow},
        Author, Book, Publisher,
    },
};

pub const PUBLISHER_COLUMNS: &str = "publishers.id, publishers.name";
pub const AUTHOR_COLUMNS: &str =
    "authors.id, authors.first_name, authors.last_name, authors.middle_name";
pub const BOOK_COLUMNS: &str = "books.id, books.title, books.year, books.description, books.pages, \
                                books.edition, books.publisher_id";

/// Authors of each book, keyed by book id
pub async fn authors_by_book<'e, E>(
    executor: E,
    book_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<Author>>>
where
    E: PgExecutor<'e>,
{
    if book_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, BookAuthorRow>(&format!(
        r#"
        SELECT aba.book_id, {AUTHOR_COLUMNS}
        FROM author_book_association aba
        JOIN authors ON authors.id = aba.author_id
        WHERE aba.book_id = ANY($1)
        ORDER BY authors.id
        "#
    ))
    .bind(book_ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<i64, Vec<Author>> = HashMap::new();
    for row in rows {
        grouped.entry(row.book_id).or_default().push(row.author);
    }
    Ok(grouped)
}

/// Books of each author, keyed by author id
pub async fn books_by_author<'e, E>(
    executor: E,
    author_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<Book>>>
where
    E: PgExecutor<'e>,
{
    if author_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, AuthorBookRow>(&format!(
        r#"
        SELECT aba.author_id, {BOOK_COLUMNS}
        FROM author_book_association aba
        JOIN books ON books.id = aba.book_id
        WHERE aba.author_id = ANY($1)
        ORDER BY books.id
        "#
    ))
    .bind(author_ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<i64, Vec<Book>> = HashMap::new();
    for row in rows {
        grouped.entry(row.author_id).or_default().push(row.book);
    }
    Ok(grouped)
}

/// Books of each publisher, keyed by publisher id
pub async fn books_by_publisher<'e, E>(
    executor: E,
    publisher_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<Book>>>
where
    E: PgExecutor<'e>,
{
    if publisher_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let books = sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE books.publisher_id = ANY($1) ORDER BY books.id"
    ))
    .bind(publisher_ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<i64, Vec<Book>> = HashMap::new();
    for book in books {
        if let Some(publisher_id) = book.publisher_id {
            grouped.entry(publisher_id).or_default().push(book);
        }
    }
    Ok(grouped)
}

/// Publishers by id
pub async fn publishers_by_id<'e, E>(executor: E, ids: &[i64]) -> AppResult<HashMap<i64, Publisher>>
where
    E: PgExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let publishers = sqlx::query_as::<_, Publisher>(&format!(
        "SELECT {PUBLISHER_COLUMNS} FROM publishers WHERE publishers.id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(publishers.into_iter().map(|p| (p.id, p)).collect())
}

/// Resolve the publisher a book points to, locking it against concurrent deletion
pub async fn resolve_publisher(
    conn: &mut PgConnection,
    publisher_id: Option<i64>,
) -> AppResult<Option<Publisher>> {
    let Some(id) = publisher_id else {
        return Ok(None);
    };

    sqlx::query_as::<_, Publisher>(&format!(
        "SELECT {PUBLISHER_COLUMNS} FROM publishers WHERE publishers.id = $1 FOR SHARE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .map(Some)
    .ok_or_else(|| AppError::not_found("publisher"))
}

/// Resolve every requested author or fail naming the ids that do not exist.
/// Found rows are locked until the transaction ends.
pub async fn resolve_authors(
    conn: &mut PgConnection,
    author_ids: &[i64],
) -> AppResult<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>(&format!(
        "SELECT {AUTHOR_COLUMNS} FROM authors \
         WHERE authors.id = ANY($1) ORDER BY authors.id FOR SHARE"
    ))
    .bind(author_ids)
    .fetch_all(&mut *conn)
    .await?;

    let missing = missing_ids(author_ids, authors.iter().map(|a| a.id));
    if !missing.is_empty() {
        tracing::debug!(?missing, "Book references unknown authors");
        return Err(AppError::MissingRelations {
            entity: "author",
            ids: missing,
        });
    }

    Ok(authors)
}

/// Replace the author set of a book
pub async fn link_authors(
    conn: &mut PgConnection,
    book_id: i64,
    author_ids: &[i64],
) -> AppResult<()> {
    sqlx::query("DELETE FROM author_book_association WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO author_book_association (book_id, author_id)
        SELECT $1, author_id FROM UNNEST($2::bigint[]) AS author_id
        "#,
    )
    .bind(book_id)
    .bind(author_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Requested ids absent from `found`, sorted and deduplicated
pub fn missing_ids(requested: &[i64], found: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let found: BTreeSet<i64> = found.into_iter().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Ids that appear more than once, in first-seen order
pub fn duplicate_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(*id) && !duplicates.contains(id) {
            duplicates.push(*id);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ids() {
        assert_eq!(missing_ids(&[1, 2, 3], [1, 2, 3]), Vec::<i64>::new());
        assert_eq!(missing_ids(&[9, 1, 7, 9], [1]), vec![7, 9]);
        assert_eq!(missing_ids(&[4], []), vec![4]);
    }

    #[test]
    fn test_duplicate_ids() {
        assert!(duplicate_ids(&[1, 2, 3]).is_empty());
        assert_eq!(duplicate_ids(&[3, 1, 3, 1, 3]), vec![3, 1]);
    }
}
