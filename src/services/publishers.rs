//! Publisher service

use crate::{
    error::AppResult,
    filter::FilterQuery,
    models::{
        BookDetails, Page, PageParams, Publisher, PublisherCreate, PublisherPatch,
        PublisherWithBooks,
    },
    repository::{books::BookScope, Repository},
};

#[derive(Clone)]
pub struct PublishersService {
    repository: Repository,
}

impl PublishersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<Page<PublisherWithBooks>> {
        let (items, total) = self.repository.publishers.list(filter, page).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<PublisherWithBooks> {
        self.repository.publishers.get_by_id(id).await
    }

    /// Books of one publisher
    pub async fn list_books(
        &self,
        id: i64,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<Page<BookDetails>> {
        self.repository.publishers.ensure_exists(id).await?;
        let (items, total) = self
            .repository
            .books
            .list(BookScope::Publisher(id), filter, page)
            .await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn create(&self, data: &PublisherCreate) -> AppResult<Publisher> {
        self.repository.publishers.create(data).await
    }

    pub async fn replace(&self, id: i64, data: &PublisherCreate) -> AppResult<Publisher> {
        self.repository.publishers.replace(id, data).await
    }

    pub async fn patch(&self, id: i64, data: &PublisherPatch) -> AppResult<Publisher> {
        self.repository.publishers.patch(id, data).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<PublisherWithBooks> {
        self.repository.publishers.delete(id).await
    }
}
