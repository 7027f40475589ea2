//! Book-Author junction rows (N:M relationship)

use sqlx::FromRow;

use super::{author::Author, book::Book};

/// Author joined through the association table, tagged with the book it belongs to
#[derive(Debug, Clone, FromRow)]
pub struct BookAuthorRow {
    pub book_id: i64,
    #[sqlx(flatten)]
    pub author: Author,
}

/// Book joined through the association table, tagged with its author
#[derive(Debug, Clone, FromRow)]
pub struct AuthorBookRow {
    pub author_id: i64,
    #[sqlx(flatten)]
    pub book: Book,
}
