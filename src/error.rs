//! Error types for the catalog server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// A single entry of an error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Location of the offending value, e.g. `["query", "year__lt"]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Vec<String>>,
    /// Human readable message
    pub msg: String,
    /// Dotted error kind, e.g. `not_found.book`
    #[serde(rename = "type")]
    pub kind: String,
}

impl ErrorDetail {
    pub fn new(msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: None,
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Error pinned to a request location
    pub fn at(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: Some(loc.iter().map(|part| part.to_string()).collect()),
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: Vec<ErrorDetail>,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No such {entity}")]
    NotFound { entity: &'static str },

    #[error("No such {entity}: {ids:?}")]
    MissingRelations { entity: &'static str, ids: Vec<i64> },

    #[error("Validation failed: {0:?}")]
    Validation(Vec<ErrorDetail>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &'static str) -> Self {
        AppError::NotFound { entity }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } | AppError::MissingRelations { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body entries rendered for this error
    pub fn details(&self) -> Vec<ErrorDetail> {
        match self {
            AppError::NotFound { entity } => vec![ErrorDetail::new(
                format!("No such {}.", entity),
                format!("not_found.{}", entity),
            )],
            AppError::MissingRelations { entity, ids } => vec![ErrorDetail::new(
                format!("No such {}: {:?}.", entity, ids),
                format!("not_found.{}", entity),
            )],
            AppError::Validation(details) => details.clone(),
            AppError::Database(_) => {
                vec![ErrorDetail::new("Database error.", "server_error.database")]
            }
            AppError::Internal(_) => {
                vec![ErrorDetail::new("Internal server error.", "server_error")]
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let field = field.to_string();
                field_errors.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}.", field));
                    ErrorDetail::at(&["body", field.as_str()], msg, e.code.to_string())
                })
            })
            .collect();
        details.sort_by(|a, b| a.loc.cmp(&b.loc));
        AppError::Validation(details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => tracing::debug!("Request rejected: {}", self),
        }

        let body = Json(ErrorResponse {
            detail: self.details(),
        });

        (self.status(), body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
