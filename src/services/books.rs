//! Book service

use crate::{
    error::{AppError, AppResult, ErrorDetail},
    filter::FilterQuery,
    models::{AuthorWithBooks, BookCreate, BookDetails, BookPatch, Page, PageParams},
    repository::{books::BookScope, relations::duplicate_ids, Repository},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<Page<BookDetails>> {
        let (items, total) = self.repository.books.list(BookScope::All, filter, page).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<BookDetails> {
        self.repository.books.get_by_id(id).await
    }

    /// Authors of one book
    pub async fn list_authors(
        &self,
        id: i64,
        filter: &FilterQuery,
        page: PageParams,
    ) -> AppResult<Page<AuthorWithBooks>> {
        self.repository.books.ensure_exists(id).await?;
        let (items, total) = self.repository.authors.list_for_book(id, filter, page).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn create(&self, data: &BookCreate) -> AppResult<BookDetails> {
        ensure_unique_authors(&data.author_ids)?;
        self.repository.books.create(data).await
    }

    pub async fn replace(&self, id: i64, data: &BookCreate) -> AppResult<BookDetails> {
        ensure_unique_authors(&data.author_ids)?;
        self.repository.books.replace(id, data).await
    }

    pub async fn patch(&self, id: i64, data: &BookPatch) -> AppResult<BookDetails> {
        if let Some(ref author_ids) = data.author_ids {
            ensure_unique_authors(author_ids)?;
        }
        self.repository.books.patch(id, data).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<BookDetails> {
        self.repository.books.delete(id).await
    }
}

/// An author can be linked to a book only once
fn ensure_unique_authors(author_ids: &[i64]) -> AppResult<()> {
    let duplicates = duplicate_ids(author_ids);
    if duplicates.is_empty() {
        return Ok(());
    }
    Err(AppError::Validation(vec![ErrorDetail::at(
        &["body", "author_ids"],
        format!("The list has duplicated items: {:?}.", duplicates),
        "value_error.list.unique_items",
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_authors_rejected() {
        assert!(ensure_unique_authors(&[1, 2, 3]).is_ok());

        let err = ensure_unique_authors(&[1, 2, 1]).unwrap_err();
        let details = err.details();
        assert_eq!(details[0].msg, "The list has duplicated items: [1].");
        assert_eq!(details[0].kind, "value_error.list.unique_items");
    }
}
