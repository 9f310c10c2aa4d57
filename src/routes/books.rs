use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use crate::dto::catalog_dto::BooksQuery;
use crate::error::{Error, Result};
use crate::middleware::auth::{ChildId, OptionalChildId};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BooksQuery>,
) -> Result<impl IntoResponse> {
    let level = query
        .level
        .ok_or_else(|| Error::Validation("level query param required".to_string()))?;
    Ok(Json(state.catalog_service.books_by_level(&level).await?))
}

#[axum::debug_handler]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    OptionalChildId(child_id): OptionalChildId,
) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog_service.book_detail(id, child_id).await?))
}

#[utoipa::path(
    post,
    path = "/books/{id}/grade",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book graded", body = Json<BookStatusReport>),
        (status = 422, description = "Missing X-Child-Id header")
    )
)]
#[axum::debug_handler]
pub async fn grade_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ChildId(child_id): ChildId,
) -> Result<impl IntoResponse> {
    Ok(Json(state.grading_service.grade_book(child_id, id).await?))
}
