//! Business logic services

pub mod authors;
pub mod books;
pub mod publishers;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub publishers: publishers::PublishersService,
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            publishers: publishers::PublishersService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            repository,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
