//! Catalog Server
//!
//! A REST JSON API for a library catalog: publishers, authors and the books
//! that link them, with filtering, sorting and pagination on every listing.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
