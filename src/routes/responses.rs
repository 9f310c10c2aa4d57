use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::dto::response_dto::SubmitResponsesRequest;
use crate::error::{Error, Result};
use crate::middleware::auth::ChildId;
use crate::middleware::json::JsonBody;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/responses",
    request_body = SubmitResponsesRequest,
    responses(
        (status = 200, description = "Attempt recorded and graded", body = Json<SubmitResponsesResponse>),
        (status = 422, description = "Missing child header, unit_id or answers")
    )
)]
#[axum::debug_handler]
pub async fn submit_responses(
    State(state): State<AppState>,
    ChildId(child_id): ChildId,
    JsonBody(req): JsonBody<SubmitResponsesRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let unit_id = req
        .unit_id
        .ok_or_else(|| Error::Validation("unit_id and answers required".to_string()))?;
    let resp = state
        .attempt_service
        .submit_responses(child_id, unit_id, req.answers)
        .await?;
    Ok(Json(resp))
}
