//! Publisher model and request payloads

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Publisher record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

/// Publisher with the books it published
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublisherWithBooks {
    #[serde(flatten)]
    pub publisher: Publisher,
    pub books: Vec<Book>,
}

/// Create or replace publisher request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PublisherCreate {
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub name: String,
}

/// Partial publisher update; only supplied fields are written
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PublisherPatch {
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub name: Option<String>,
}

impl PublisherPatch {
    pub fn apply(&self, current: Publisher) -> Publisher {
        Publisher {
            id: current.id,
            name: self.name.clone().unwrap_or(current.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_keeps_unset_fields() {
        let current = Publisher {
            id: 4,
            name: "Grand 42 Ltd.".to_string(),
        };
        let patched = PublisherPatch::default().apply(current.clone());
        assert_eq!(patched, current);

        let patched = PublisherPatch {
            name: Some("Grand 43 Ltd.".to_string()),
        }
        .apply(current);
        assert_eq!(patched.id, 4);
        assert_eq!(patched.name, "Grand 43 Ltd.");
    }

    #[test]
    fn test_empty_name_rejected() {
        let data = PublisherCreate { name: String::new() };
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_publisher_with_books_is_flat() {
        let value = serde_json::to_value(PublisherWithBooks {
            publisher: Publisher {
                id: 1,
                name: "React Exact Publisher".to_string(),
            },
            books: vec![],
        })
        .unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "React Exact Publisher");
        assert!(value["books"].as_array().unwrap().is_empty());
    }
}
