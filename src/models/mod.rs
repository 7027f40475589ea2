//! Data models for the catalog

pub mod association;
pub mod author;
pub mod book;
pub mod page;
pub mod publisher;

// Re-export commonly used types
pub use author::{Author, AuthorCreate, AuthorPatch, AuthorWithBooks};
pub use book::{Book, BookCreate, BookDetails, BookPatch};
pub use page::{Page, PageParams};
pub use publisher::{Publisher, PublisherCreate, PublisherPatch, PublisherWithBooks};
