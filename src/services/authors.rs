//! Author service

use crate::{
    error::AppResult,
    filter::FilterQuery,
    models::{Author, AuthorCreate, AuthorPatch, AuthorWithBooks, BookDetails, Page, PageParams},
    repository::{books::BookScope, Repository},
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<Page<AuthorWithBooks>> {
        let (items, total) = self.repository.authors.list(filter, page).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<AuthorWithBooks> {
        self.repository.authors.get_by_id(id).await
    }

    /// Books written by one author
    pub async fn list_books(
        &self,
        id: i64,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<Page<BookDetails>> {
        self.repository.authors.ensure_exists(id).await?;
        let (items, total) = self
            .repository
            .books
            .list(BookScope::Author(id), filter, page)
            .await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn create(&self, data: &AuthorCreate) -> AppResult<Author> {
        self.repository.authors.create(data).await
    }

    pub async fn replace(&self, id: i64, data: &AuthorCreate) -> AppResult<Author> {
        self.repository.authors.replace(id, data).await
    }

    pub async fn patch(&self, id: i64, data: &AuthorPatch) -> AppResult<Author> {
        self.repository.authors.patch(id, data).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<AuthorWithBooks> {
        self.repository.authors.delete(id).await
    }
}
