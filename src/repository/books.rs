//! Books repository for database operations.
//!
//! Every write resolves the referenced publisher and authors inside the same
//! transaction as the INSERT/UPDATE, so a missing reference leaves no trace.

use sqlx::{PgConnection, Pool, Postgres};

use super::{
    listing::Listing,
    relations::{self, BOOK_COLUMNS},
};
use crate::{
    error::{AppError, AppResult},
    filter::FilterQuery,
    models::{Book, BookCreate, BookDetails, BookPatch, PageParams},
};

/// Which books a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookScope {
    All,
    Publisher(i64),
    Author(i64),
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List books with authors and publisher
    pub async fn list(
        &self,
        scope: BookScope,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<(Vec<BookDetails>, i64)> {
        let listing = match scope {
            BookScope::All => Listing::new(BOOK_COLUMNS, "books", filter),
            BookScope::Publisher(id) => {
                Listing::new(BOOK_COLUMNS, "books", filter).scoped("books.publisher_id", id)
            }
            BookScope::Author(id) => Listing::new(
                BOOK_COLUMNS,
                "books JOIN author_book_association aba ON aba.book_id = books.id",
                filter,
            )
            .scoped("aba.author_id", id),
        };

        let (books, total) = listing.fetch_page::<Book>(&self.pool, page).await?;
        Ok((self.with_details(books).await?, total))
    }

    async fn with_details(&self, books: Vec<Book>) -> AppResult<Vec<BookDetails>> {
        let book_ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        let mut publisher_ids: Vec<i64> = books.iter().filter_map(|b| b.publisher_id).collect();
        publisher_ids.sort_unstable();
        publisher_ids.dedup();

        let mut authors = relations::authors_by_book(&self.pool, &book_ids).await?;
        let publishers = relations::publishers_by_id(&self.pool, &publisher_ids).await?;

        Ok(books
            .into_iter()
            .map(|book| BookDetails {
                authors: authors.remove(&book.id).unwrap_or_default(),
                publisher: book.publisher_id.and_then(|id| publishers.get(&id).cloned()),
                book,
            })
            .collect())
    }

    /// Get book by ID with authors and publisher
    pub async fn get_by_id(&self, id: i64) -> AppResult<BookDetails> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE books.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("book"))?;

        self.with_details(vec![book])
            .await?
            .pop()
            .ok_or_else(|| {
                AppError::Internal(format!("Book {} vanished while loading relations", id))
            })
    }

    /// Fail with Not-Found unless the book exists
    pub async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::not_found("book"));
        }
        Ok(())
    }

    /// Create a new book linked to existing publisher and authors
    pub async fn create(&self, data: &BookCreate) -> AppResult<BookDetails> {
        let mut tx = self.pool.begin().await?;

        let publisher = relations::resolve_publisher(&mut tx, data.publisher_id).await?;
        let authors = relations::resolve_authors(&mut tx, &data.author_ids).await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, year, description, pages, edition, publisher_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&data.title)
        .bind(data.year)
        .bind(&data.description)
        .bind(data.pages)
        .bind(data.edition)
        .bind(data.publisher_id)
        .fetch_one(&mut *tx)
        .await?;

        relations::link_authors(&mut tx, book.id, &data.author_ids).await?;
        tx.commit().await?;

        tracing::info!(book_id = book.id, authors = authors.len(), "Book created");
        Ok(BookDetails {
            book,
            authors,
            publisher,
        })
    }

    /// Overwrite every mutable field and the author set
    pub async fn replace(&self, id: i64, data: &BookCreate) -> AppResult<BookDetails> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut tx, id).await?;
        let publisher = relations::resolve_publisher(&mut tx, data.publisher_id).await?;
        let authors = relations::resolve_authors(&mut tx, &data.author_ids).await?;

        let book = write(&mut tx, &data.apply(current)).await?;
        relations::link_authors(&mut tx, id, &data.author_ids).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, "Book replaced");
        Ok(BookDetails {
            book,
            authors,
            publisher,
        })
    }

    /// Overwrite only the supplied fields; `author_ids`, when given, replaces the author set
    pub async fn patch(&self, id: i64, data: &BookPatch) -> AppResult<BookDetails> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut tx, id).await?;
        let updated = data.apply(current);
        let publisher = relations::resolve_publisher(&mut tx, updated.publisher_id).await?;

        let authors = match &data.author_ids {
            Some(author_ids) => {
                let authors = relations::resolve_authors(&mut tx, author_ids).await?;
                relations::link_authors(&mut tx, id, author_ids).await?;
                authors
            }
            None => relations::authors_by_book(&mut *tx, &[id])
                .await?
                .remove(&id)
                .unwrap_or_default(),
        };

        let book = write(&mut tx, &updated).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, "Book patched");
        Ok(BookDetails {
            book,
            authors,
            publisher,
        })
    }

    /// Delete a book together with its author associations
    pub async fn delete(&self, id: i64) -> AppResult<BookDetails> {
        let mut tx = self.pool.begin().await?;

        let book = lock(&mut tx, id).await?;
        let authors = relations::authors_by_book(&mut *tx, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        let publisher = match book.publisher_id {
            Some(publisher_id) => relations::publishers_by_id(&mut *tx, &[publisher_id])
                .await?
                .remove(&publisher_id),
            None => None,
        };

        sqlx::query("DELETE FROM author_book_association WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(book_id = id, "Book deleted");
        Ok(BookDetails {
            book,
            authors,
            publisher,
        })
    }
}

/// Read a book and hold a row lock until the transaction ends
async fn lock(conn: &mut PgConnection, id: i64) -> AppResult<Book> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE books.id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("book"))
}

async fn write(conn: &mut PgConnection, book: &Book) -> AppResult<Book> {
    let row = sqlx::query_as::<_, Book>(&format!(
        r#"
        UPDATE books
        SET title = $2, year = $3, description = $4, pages = $5, edition = $6, publisher_id = $7
        WHERE id = $1
        RETURNING {BOOK_COLUMNS}
        "#
    ))
    .bind(book.id)
    .bind(&book.title)
    .bind(book.year)
    .bind(&book.description)
    .bind(book.pages)
    .bind(book.edition)
    .bind(book.publisher_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}
