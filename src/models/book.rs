//! Book model, nested representation and request payloads

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::Author, publisher::Publisher};

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub description: Option<String>,
    pub pages: Option<i32>,
    pub edition: Option<i32>,
    pub publisher_id: Option<i64>,
}

/// Book with its authors and publisher
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub authors: Vec<Author>,
    pub publisher: Option<Publisher>,
}

/// Create or replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookCreate {
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pages: Option<i32>,
    #[serde(default)]
    pub edition: Option<i32>,
    #[serde(default)]
    pub publisher_id: Option<i64>,
    /// Authors of the book; every id must exist
    #[validate(length(
        min = 1,
        code = "value_error.list.min_items",
        message = "Ensure this value has at least 1 items."
    ))]
    pub author_ids: Vec<i64>,
}

/// Partial book update. `author_ids`, when present, replaces the author set.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookPatch {
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub title: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub pages: Option<i32>,
    pub edition: Option<i32>,
    pub publisher_id: Option<i64>,
    #[validate(length(
        min = 1,
        code = "value_error.list.min_items",
        message = "Ensure this value has at least 1 items."
    ))]
    pub author_ids: Option<Vec<i64>>,
}

impl BookCreate {
    pub fn apply(&self, current: Book) -> Book {
        Book {
            id: current.id,
            title: self.title.clone(),
            year: self.year,
            description: self.description.clone(),
            pages: self.pages,
            edition: self.edition,
            publisher_id: self.publisher_id,
        }
    }
}

impl BookPatch {
    pub fn apply(&self, current: Book) -> Book {
        Book {
            id: current.id,
            title: self.title.clone().unwrap_or(current.title),
            year: self.year.unwrap_or(current.year),
            description: self.description.clone().or(current.description),
            pages: self.pages.or(current.pages),
            edition: self.edition.or(current.edition),
            publisher_id: self.publisher_id.or(current.publisher_id),
        }
    }
}
