//! API handlers for the catalog REST endpoints

pub mod authors;
pub mod books;
pub mod health;
pub mod openapi;
pub mod publishers;

use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{
    error::{AppError, ErrorDetail},
    filter::{self, FilterQuery, Filterable},
    models::PageParams,
    AppState,
};

/// Validated filters and page request for listing `E`.
/// Rejects the request before any query runs.
pub struct ListParams<E> {
    pub filter: FilterQuery,
    pub page: PageParams,
    entity: PhantomData<fn() -> E>,
}

#[async_trait]
impl<E> FromRequestParts<AppState> for ListParams<E>
where
    E: Filterable + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                AppError::Validation(vec![ErrorDetail::at(
                    &["query"],
                    "Query string could not be parsed.",
                    "value_error.query",
                )])
            })?;

        let filter = filter::parse(E::filter_spec(), &pairs);
        let page = PageParams::parse(&pairs, &state.config.pagination);

        match (filter, page) {
            (Ok(filter), Ok(page)) => Ok(ListParams {
                filter,
                page,
                entity: PhantomData,
            }),
            (filter, page) => {
                let mut details = filter.err().unwrap_or_default();
                details.extend(page.err().unwrap_or_default());
                Err(AppError::Validation(details))
            }
        }
    }
}

/// Numeric `:id` path segment
pub struct EntityId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await.map_err(|_| {
            AppError::Validation(vec![ErrorDetail::at(
                &["path", "id"],
                "Value is not a valid integer.",
                "type_error.integer",
            )])
        })?;
        Ok(EntityId(id))
    }
}

/// JSON body that has been deserialized and passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(json_rejection)?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let msg = match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`.".to_string()
        }
        other => sentence(other.body_text()),
    };
    AppError::Validation(vec![ErrorDetail::at(&["body"], msg, "value_error.json")])
}

/// Capitalise and terminate with a period
fn sentence(text: String) -> String {
    let text = text.trim();
    let mut chars = text.chars();
    let mut out: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return "Invalid request body.".to_string(),
    };
    if !out.ends_with('.') {
        out.push('.');
    }
    out
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Publishers
        .route(
            "/publishers",
            get(publishers::list_publishers).post(publishers::create_publisher),
        )
        .route(
            "/publishers/:id",
            get(publishers::get_publisher)
                .put(publishers::update_publisher)
                .patch(publishers::patch_publisher)
                .delete(publishers::delete_publisher),
        )
        .route("/publishers/:id/books", get(publishers::list_publisher_books))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .patch(authors::patch_author)
                .delete(authors::delete_author),
        )
        .route("/authors/:id/books", get(authors::list_author_books))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .patch(books::patch_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/authors", get(books::list_book_authors))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
