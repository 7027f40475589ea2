//! Book endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{Author, AuthorWithBooks, Book, BookCreate, BookDetails, BookPatch, Page},
};

use super::{EntityId, ListParams, ValidatedJson};

/// List books with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("title__ilike" = Option<String>, Query, description = "Case-insensitive substring of the title"),
        ("description__ilike" = Option<String>, Query, description = "Case-insensitive substring of the description"),
        ("year" = Option<i32>, Query, description = "Exact publication year"),
        ("year__gte" = Option<i32>, Query, description = "Published in or after"),
        ("year__lt" = Option<i32>, Query, description = "Published before"),
        ("pages" = Option<i32>, Query, description = "Exact page count"),
        ("pages__gte" = Option<i32>, Query, description = "At least this many pages"),
        ("pages__lt" = Option<i32>, Query, description = "Fewer pages than this"),
        ("edition" = Option<i32>, Query, description = "Exact edition"),
        ("order_by" = Option<String>, Query, description = "Comma-separated columns, `-` prefix for descending"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("size" = Option<i64>, Query, description = "Page size (default: 50)")
    ),
    responses(
        (status = 200, description = "Page of books", body = BookPage),
        (status = 422, description = "Invalid filter or page", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    params: ListParams<Book>,
) -> AppResult<Json<Page<BookDetails>>> {
    let page = state.services.books.list(&params.filter, params.page).await?;
    Ok(Json(page))
}

/// Get book by ID with its authors and publisher
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// List the authors of a book
#[utoipa::path(
    get,
    path = "/books/{id}/authors",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("last_name__ilike" = Option<String>, Query, description = "Case-insensitive substring of the last name"),
        ("order_by" = Option<String>, Query, description = "Comma-separated columns"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("size" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Page of authors", body = AuthorPage),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn list_book_authors(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    params: ListParams<Author>,
) -> AppResult<Json<Page<AuthorWithBooks>>> {
    let page = state
        .services
        .books
        .list_authors(id, &params.filter, params.page)
        .await?;
    Ok(Json(page))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookCreate,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 404, description = "Publisher or authors not found", body = ErrorResponse),
        (status = 422, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<BookCreate>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    let book = state.services.books.create(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book and its author set
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookCreate,
    responses(
        (status = 200, description = "Book replaced", body = BookDetails),
        (status = 404, description = "Book, publisher or authors not found", body = ErrorResponse),
        (status = 422, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<BookCreate>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.replace(id, &data).await?;
    Ok(Json(book))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 404, description = "Book, publisher or authors not found", body = ErrorResponse),
        (status = 422, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn patch_book(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<BookPatch>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.patch(id, &data).await?;
    Ok(Json(book))
}

/// Delete a book and its author associations
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Deleted book", body = BookDetails),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.delete(id).await?;
    Ok(Json(book))
}
