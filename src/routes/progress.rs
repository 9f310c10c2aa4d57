use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

#[axum::debug_handler]
pub async fn child_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.progress_service.child_report(id).await?))
}
