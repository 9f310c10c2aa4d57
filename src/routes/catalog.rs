use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::dto::catalog_dto::{QuestionsQuery, UnitsQuery};
use crate::error::{Error, Result};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_levels(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog_service.list_levels().await?))
}

#[axum::debug_handler]
pub async fn list_skills(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog_service.list_skills().await?))
}

#[axum::debug_handler]
pub async fn list_units(
    State(state): State<AppState>,
    Query(query): Query<UnitsQuery>,
) -> Result<impl IntoResponse> {
    let book_id = query
        .book_id
        .ok_or_else(|| Error::Validation("book_id required".to_string()))?;
    Ok(Json(state.catalog_service.units_by_book(book_id).await?))
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionsQuery>,
) -> Result<impl IntoResponse> {
    let unit_id = query
        .unit_id
        .ok_or_else(|| Error::Validation("unit_id required".to_string()))?;
    Ok(Json(state.catalog_service.unit_questions(unit_id).await?))
}
