//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, health, publishers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Library catalog REST API: publishers, authors and books",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Publishers
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::list_publisher_books,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::patch_publisher,
        publishers::delete_publisher,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::list_author_books,
        authors::create_author,
        authors::update_author,
        authors::patch_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::list_book_authors,
        books::create_book,
        books::update_book,
        books::patch_book,
        books::delete_book,
    ),
    components(
        schemas(
            // Publishers
            crate::models::Publisher,
            crate::models::PublisherWithBooks,
            crate::models::PublisherCreate,
            crate::models::PublisherPatch,
            // Authors
            crate::models::Author,
            crate::models::AuthorWithBooks,
            crate::models::AuthorCreate,
            crate::models::AuthorPatch,
            // Books
            crate::models::Book,
            crate::models::BookDetails,
            crate::models::BookCreate,
            crate::models::BookPatch,
            // Pages
            crate::models::page::PublisherPage,
            crate::models::page::AuthorPage,
            crate::models::page::BookPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "publishers", description = "Publisher management"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book management and authorship")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
