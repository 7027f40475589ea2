//! Author endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{Author, AuthorCreate, AuthorPatch, AuthorWithBooks, Book, BookDetails, Page},
};

use super::{EntityId, ListParams, ValidatedJson};

/// List authors with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(
        ("first_name__ilike" = Option<String>, Query, description = "Case-insensitive substring of the first name"),
        ("last_name__ilike" = Option<String>, Query, description = "Case-insensitive substring of the last name"),
        ("middle_name__ilike" = Option<String>, Query, description = "Case-insensitive substring of the middle name"),
        ("order_by" = Option<String>, Query, description = "Comma-separated columns, `-` prefix for descending"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("size" = Option<i64>, Query, description = "Page size (default: 50)")
    ),
    responses(
        (status = 200, description = "Page of authors", body = AuthorPage),
        (status = 422, description = "Invalid filter or page", body = ErrorResponse)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    params: ListParams<Author>,
) -> AppResult<Json<Page<AuthorWithBooks>>> {
    let page = state.services.authors.list(&params.filter, params.page).await?;
    Ok(Json(page))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author with their books", body = AuthorWithBooks),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<AuthorWithBooks>> {
    let author = state.services.authors.get_by_id(id).await?;
    Ok(Json(author))
}

/// List the books written by an author
#[utoipa::path(
    get,
    path = "/authors/{id}/books",
    tag = "authors",
    params(
        ("id" = i64, Path, description = "Author ID"),
        ("title__ilike" = Option<String>, Query, description = "Case-insensitive substring of the title"),
        ("year__gte" = Option<i32>, Query, description = "Published in or after"),
        ("year__lt" = Option<i32>, Query, description = "Published before"),
        ("order_by" = Option<String>, Query, description = "Comma-separated columns"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("size" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Page of books", body = BookPage),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn list_author_books(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    params: ListParams<Book>,
) -> AppResult<Json<Page<BookDetails>>> {
    let page = state
        .services
        .authors
        .list_books(id, &params.filter, params.page)
        .await?;
    Ok(Json(page))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = AuthorCreate,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 422, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<AuthorCreate>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.authors.create(&data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Replace an author; an omitted middle name is cleared
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    request_body = AuthorCreate,
    responses(
        (status = 200, description = "Author replaced", body = Author),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<AuthorCreate>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.replace(id, &data).await?;
    Ok(Json(author))
}

/// Partially update an author
#[utoipa::path(
    patch,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    request_body = AuthorPatch,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn patch_author(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<AuthorPatch>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.patch(id, &data).await?;
    Ok(Json(author))
}

/// Delete an author and their book associations
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Deleted author", body = AuthorWithBooks),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<AuthorWithBooks>> {
    let author = state.services.authors.delete(id).await?;
    Ok(Json(author))
}
