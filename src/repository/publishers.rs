//! Publishers repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use super::{
    listing::Listing,
    relations::{self, PUBLISHER_COLUMNS},
};
use crate::{
    error::{AppError, AppResult},
    filter::FilterQuery,
    models::{PageParams, Publisher, PublisherCreate, PublisherPatch, PublisherWithBooks},
};

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool<Postgres>,
}

impl PublishersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List publishers with their books
    pub async fn list(
        &self,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<(Vec<PublisherWithBooks>, i64)> {
        let (publishers, total) = Listing::new(PUBLISHER_COLUMNS, "publishers", filter)
            .fetch_page::<Publisher>(&self.pool, page)
            .await?;

        let ids: Vec<i64> = publishers.iter().map(|p| p.id).collect();
        let mut books = relations::books_by_publisher(&self.pool, &ids).await?;

        let items = publishers
            .into_iter()
            .map(|publisher| PublisherWithBooks {
                books: books.remove(&publisher.id).unwrap_or_default(),
                publisher,
            })
            .collect();

        Ok((items, total))
    }

    /// Get publisher by ID with its books
    pub async fn get_by_id(&self, id: i64) -> AppResult<PublisherWithBooks> {
        let publisher = sqlx::query_as::<_, Publisher>(&format!(
            "SELECT {PUBLISHER_COLUMNS} FROM publishers WHERE publishers.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("publisher"))?;

        let books = relations::books_by_publisher(&self.pool, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(PublisherWithBooks { publisher, books })
    }

    /// Fail with Not-Found unless the publisher exists
    pub async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM publishers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::not_found("publisher"));
        }
        Ok(())
    }

    /// Create a new publisher
    pub async fn create(&self, data: &PublisherCreate) -> AppResult<Publisher> {
        let publisher = sqlx::query_as::<_, Publisher>(
            "INSERT INTO publishers (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(publisher_id = publisher.id, "Publisher created");
        Ok(publisher)
    }

    /// Overwrite every mutable field
    pub async fn replace(&self, id: i64, data: &PublisherCreate) -> AppResult<Publisher> {
        let mut tx = self.pool.begin().await?;
        let mut publisher = lock(&mut tx, id).await?;
        publisher.name = data.name.clone();
        let publisher = write(&mut tx, &publisher).await?;
        tx.commit().await?;

        tracing::info!(publisher_id = id, "Publisher replaced");
        Ok(publisher)
    }

    /// Overwrite only the supplied fields
    pub async fn patch(&self, id: i64, data: &PublisherPatch) -> AppResult<Publisher> {
        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;
        let publisher = write(&mut tx, &data.apply(current)).await?;
        tx.commit().await?;

        tracing::info!(publisher_id = id, "Publisher patched");
        Ok(publisher)
    }

    /// Delete a publisher. Its books are kept and detached.
    ///
    /// Book writes lock the book before the publisher, so the dependent books
    /// are locked here before the publisher row.
    pub async fn delete(&self, id: i64) -> AppResult<PublisherWithBooks> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT id FROM books WHERE publisher_id = $1 ORDER BY id FOR UPDATE")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let publisher = lock(&mut tx, id).await?;
        let books = relations::books_by_publisher(&mut *tx, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        sqlx::query("UPDATE books SET publisher_id = NULL WHERE publisher_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(publisher_id = id, detached_books = books.len(), "Publisher deleted");
        Ok(PublisherWithBooks { publisher, books })
    }
}

/// Read a publisher and hold a row lock until the transaction ends
async fn lock(conn: &mut PgConnection, id: i64) -> AppResult<Publisher> {
    sqlx::query_as::<_, Publisher>(&format!(
        "SELECT {PUBLISHER_COLUMNS} FROM publishers WHERE publishers.id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("publisher"))
}

async fn write(conn: &mut PgConnection, publisher: &Publisher) -> AppResult<Publisher> {
    let row = sqlx::query_as::<_, Publisher>(
        "UPDATE publishers SET name = $2 WHERE id = $1 RETURNING id, name",
    )
    .bind(publisher.id)
    .bind(&publisher.name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}
