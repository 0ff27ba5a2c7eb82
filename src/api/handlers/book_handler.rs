//! Book catalogue handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{authorize_owner_or_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{BookResponse, CreateBook, PurchaseReceipt, UpdateBook};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Public catalogue routes
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books))
        .route("/:id", get(get_book))
}

/// Session-protected catalogue routes
pub fn protected_book_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_book))
        .route("/:id", put(update_book))
        .route("/:id", delete(delete_book))
        .route("/:id/purchase", post(purchase_book))
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "Books",
    responses((status = 200, description = "All books", body = [BookResponse]))
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.book_service.list_books().await?;
    Ok(Json(books))
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookResponse>> {
    let book = state.book_service.get_book(id).await?;
    Ok(Json(book))
}

/// Upload a new book listing
#[utoipa::path(
    post,
    path = "/books",
    tag = "Books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateBook>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let book = state
        .book_service
        .create_book(payload, current_user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book listing (owner or admin)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "Books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateBook>,
) -> AppResult<Json<BookResponse>> {
    let books = state.book_service.clone();
    authorize_owner_or_admin(&current_user, Some(id), |id| async move {
        books.book_owner(id).await
    })
    .await?;

    let book = state.book_service.update_book(id, payload).await?;
    Ok(Json(book))
}

/// Delete a book listing (owner or admin)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "Books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let books = state.book_service.clone();
    authorize_owner_or_admin(&current_user, Some(id), |id| async move {
        books.book_owner(id).await
    })
    .await?;

    state.book_service.delete_book(id).await?;
    Ok(Json(MessageResponse::new("Book deleted")))
}

/// Purchase a book (mock checkout)
#[utoipa::path(
    post,
    path = "/books/{id}/purchase",
    tag = "Books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Purchase receipt", body = PurchaseReceipt),
        (status = 404, description = "Book not found")
    )
)]
pub async fn purchase_book(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurchaseReceipt>> {
    let receipt = state.book_service.purchase_book(id, current_user.id).await?;
    Ok(Json(receipt))
}
