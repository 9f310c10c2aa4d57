use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::dto::child_dto::{CreateChildRequest, UpdateChildRequest};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::middleware::json::JsonBody;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_children(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let parent_id = claims.parent_id()?;
    Ok(Json(state.child_service.list(parent_id).await?))
}

#[utoipa::path(
    post,
    path = "/children",
    request_body = CreateChildRequest,
    responses(
        (status = 201, description = "Child profile created", body = Json<ChildSummary>),
        (status = 422, description = "Missing name or unknown level_code")
    )
)]
#[axum::debug_handler]
pub async fn create_child(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateChildRequest>,
) -> Result<impl IntoResponse> {
    let parent_id = claims.parent_id()?;
    let (Some(name), Some(level_code)) = (req.name, req.level_code) else {
        return Err(Error::Validation("name and level_code required".to_string()));
    };
    let child = state
        .child_service
        .create(parent_id, &name, &level_code)
        .await?;
    Ok((StatusCode::CREATED, Json(child)))
}

#[axum::debug_handler]
pub async fn update_child(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateChildRequest>,
) -> Result<impl IntoResponse> {
    let parent_id = claims.parent_id()?;
    if req.name.is_none() && req.level_code.is_none() {
        return Err(Error::Validation("No valid fields to update".to_string()));
    }
    let child = state
        .child_service
        .update(parent_id, id, req.name, req.level_code)
        .await?;
    Ok(Json(child))
}
