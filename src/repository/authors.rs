//! Authors repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use super::{
    listing::Listing,
    relations::{self, AUTHOR_COLUMNS},
};
use crate::{
    error::{AppError, AppResult},
    filter::FilterQuery,
    models::{Author, AuthorCreate, AuthorPatch, AuthorWithBooks, PageParams},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List authors with their books
    pub async fn list(
        &self,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<(Vec<AuthorWithBooks>, i64)> {
        let (authors, total) = Listing::new(AUTHOR_COLUMNS, "authors", filter)
            .fetch_page::<Author>(&self.pool, page)
            .await?;
        Ok((self.with_books(authors).await?, total))
    }

    /// List the authors of one book
    pub async fn list_for_book(
        &self,
        book_id: i64,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<(Vec<AuthorWithBooks>, i64)> {
        let (authors, total) = Listing::new(
            AUTHOR_COLUMNS,
            "authors JOIN author_book_association aba ON aba.author_id = authors.id",
            filter,
        )
        .scoped("aba.book_id", book_id)
        .fetch_page::<Author>(&self.pool, page)
        .await?;
        Ok((self.with_books(authors).await?, total))
    }

    async fn with_books(&self, authors: Vec<Author>) -> AppResult<Vec<AuthorWithBooks>> {
        let ids: Vec<i64> = authors.iter().map(|a| a.id).collect();
        let mut books = relations::books_by_author(&self.pool, &ids).await?;

        Ok(authors
            .into_iter()
            .map(|author| AuthorWithBooks {
                books: books.remove(&author.id).unwrap_or_default(),
                author,
            })
            .collect())
    }

    /// Get author by ID with their books
    pub async fn get_by_id(&self, id: i64) -> AppResult<AuthorWithBooks> {
        let author = sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE authors.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("author"))?;

        let books = relations::books_by_author(&self.pool, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(AuthorWithBooks { author, books })
    }

    /// Fail with Not-Found unless the author exists
    pub async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::not_found("author"));
        }
        Ok(())
    }

    /// Create a new author
    pub async fn create(&self, data: &AuthorCreate) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, middle_name)
            VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, middle_name
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.middle_name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    /// Overwrite every mutable field; an omitted middle name becomes NULL
    pub async fn replace(&self, id: i64, data: &AuthorCreate) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;
        let author = write(&mut tx, &data.apply(current)).await?;
        tx.commit().await?;

        tracing::info!(author_id = id, "Author replaced");
        Ok(author)
    }

    /// Overwrite only the supplied fields
    pub async fn patch(&self, id: i64, data: &AuthorPatch) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;
        let author = write(&mut tx, &data.apply(current)).await?;
        tx.commit().await?;

        tracing::info!(author_id = id, "Author patched");
        Ok(author)
    }

    /// Delete an author together with its book associations
    pub async fn delete(&self, id: i64) -> AppResult<AuthorWithBooks> {
        let mut tx = self.pool.begin().await?;
        let author = lock(&mut tx, id).await?;
        let books = relations::books_by_author(&mut *tx, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        sqlx::query("DELETE FROM author_book_association WHERE author_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(author_id = id, "Author deleted");
        Ok(AuthorWithBooks { author, books })
    }
}

/// Read an author and hold a row lock until the transaction ends
async fn lock(conn: &mut PgConnection, id: i64) -> AppResult<Author> {
    sqlx::query_as::<_, Author>(&format!(
        "SELECT {AUTHOR_COLUMNS} FROM authors WHERE authors.id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("author"))
}

async fn write(conn: &mut PgConnection, author: &Author) -> AppResult<Author> {
    let row = sqlx::query_as::<_, Author>(
        r#"
        UPDATE authors SET first_name = $2, last_name = $3, middle_name = $4
        WHERE id = $1
        RETURNING id, first_name, last_name, middle_name
        "#,
    )
    .bind(author.id)
    .bind(&author.first_name)
    .bind(&author.last_name)
    .bind(&author.middle_name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}
