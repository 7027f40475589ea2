//! Author model and request payloads

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Author record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
}

/// Author with the books they wrote
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}

/// Create or replace author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AuthorCreate {
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub first_name: String,
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
}

/// Partial author update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AuthorPatch {
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub first_name: Option<String>,
    #[validate(length(
        min = 1,
        code = "value_error.any_str.min_length",
        message = "Ensure this value has at least 1 characters."
    ))]
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
}

impl AuthorCreate {
    /// Full replacement: every mutable column comes from the payload
    pub fn apply(&self, current: Author) -> Author {
        Author {
            id: current.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: self.middle_name.clone(),
        }
    }
}

impl AuthorPatch {
    pub fn apply(&self, current: Author) -> Author {
        Author {
            id: current.id,
            first_name: self.first_name.clone().unwrap_or(current.first_name),
            last_name: self.last_name.clone().unwrap_or(current.last_name),
            middle_name: self.middle_name.clone().or(current.middle_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tkachenko() -> Author {
        Author {
            id: 1,
            first_name: "Владислав".to_string(),
            last_name: "Ткаченко".to_string(),
            middle_name: Some("Юрьевич".to_string()),
        }
    }

    #[test]
    fn test_replace_resets_middle_name() {
        let data = AuthorCreate {
            first_name: "Vladislav".to_string(),
            last_name: "Tkachenko".to_string(),
            middle_name: None,
        };
        let replaced = data.apply(tkachenko());
        assert_eq!(replaced.id, 1);
        assert_eq!(replaced.first_name, "Vladislav");
        assert_eq!(replaced.middle_name, None);
    }

    #[test]
    fn test_patch_changes_only_supplied_fields() {
        let patch = AuthorPatch {
            last_name: Some("Tkachenko".to_string()),
            ..Default::default()
        };
        let patched = patch.apply(tkachenko());
        assert_eq!(patched.first_name, "Владислав");
        assert_eq!(patched.last_name, "Tkachenko");
        assert_eq!(patched.middle_name.as_deref(), Some("Юрьевич"));
    }

    #[test]
    fn test_patch_from_json_ignores_nulls() {
        let patch: AuthorPatch =
            serde_json::from_str(r#"{"first_name": "Vlad", "middle_name": null}"#).unwrap();
        let patched = patch.apply(tkachenko());
        assert_eq!(patched.first_name, "Vlad");
        assert_eq!(patched.middle_name.as_deref(), Some("Юрьевич"));
    }
}
