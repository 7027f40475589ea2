//! Publisher endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        Book, BookDetails, Page, Publisher, PublisherCreate, PublisherPatch, PublisherWithBooks,
    },
};

use super::{EntityId, ListParams, ValidatedJson};

/// List publishers with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/publishers",
    tag = "publishers",
    params(
        ("name__ilike" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("order_by" = Option<String>, Query, description = "Comma-separated columns, `-` prefix for descending"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("size" = Option<i64>, Query, description = "Page size (default: 50)")
    ),
    responses(
        (status = 200, description = "Page of publishers", body = PublisherPage),
        (status = 422, description = "Invalid filter or page", body = ErrorResponse)
    )
)]
pub async fn list_publishers(
    State(state): State<crate::AppState>,
    params: ListParams<Publisher>,
) -> AppResult<Json<Page<PublisherWithBooks>>> {
    let page = state.services.publishers.list(&params.filter, params.page).await?;
    Ok(Json(page))
}

/// Get publisher by ID
#[utoipa::path(
    get,
    path = "/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Publisher with its books", body = PublisherWithBooks),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
pub async fn get_publisher(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<PublisherWithBooks>> {
    let publisher = state.services.publishers.get_by_id(id).await?;
    Ok(Json(publisher))
}

/// List the books of a publisher
#[utoipa::path(
    get,
    path = "/publishers/{id}/books",
    tag = "publishers",
    params(
        ("id" = i64, Path, description = "Publisher ID"),
        ("title__ilike" = Option<String>, Query, description = "Case-insensitive substring of the title"),
        ("year__gte" = Option<i32>, Query, description = "Published in or after"),
        ("year__lt" = Option<i32>, Query, description = "Published before"),
        ("order_by" = Option<String>, Query, description = "Comma-separated columns"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("size" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Page of books", body = BookPage),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
pub async fn list_publisher_books(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    params: ListParams<Book>,
) -> AppResult<Json<Page<BookDetails>>> {
    let page = state
        .services
        .publishers
        .list_books(id, &params.filter, params.page)
        .await?;
    Ok(Json(page))
}

/// Create a publisher
#[utoipa::path(
    post,
    path = "/publishers",
    tag = "publishers",
    request_body = PublisherCreate,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 422, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn create_publisher(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<PublisherCreate>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    let publisher = state.services.publishers.create(&data).await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

/// Replace a publisher
#[utoipa::path(
    put,
    path = "/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher ID")),
    request_body = PublisherCreate,
    responses(
        (status = 200, description = "Publisher replaced", body = Publisher),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
pub async fn update_publisher(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<PublisherCreate>,
) -> AppResult<Json<Publisher>> {
    let publisher = state.services.publishers.replace(id, &data).await?;
    Ok(Json(publisher))
}

/// Partially update a publisher
#[utoipa::path(
    patch,
    path = "/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher ID")),
    request_body = PublisherPatch,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
pub async fn patch_publisher(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<PublisherPatch>,
) -> AppResult<Json<Publisher>> {
    let publisher = state.services.publishers.patch(id, &data).await?;
    Ok(Json(publisher))
}

/// Delete a publisher; its books are kept without a publisher
#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Deleted publisher", body = PublisherWithBooks),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
pub async fn delete_publisher(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<PublisherWithBooks>> {
    let publisher = state.services.publishers.delete(id).await?;
    Ok(Json(publisher))
}
