use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

pub const CHILD_ID_HEADER: &str = "x-child-id";

/// Claims issued by the identity provider for a parent/guardian account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

impl Claims {
    pub fn parent_id(&self) -> crate::error::Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| Error::Unauthorized("Invalid subject claim".to_string()))
    }
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Error::Unauthorized("Missing Authorization header".to_string()).into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Error::Unauthorized("Malformed Authorization header".to_string()).into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Error::Unauthorized("Unsupported authorization scheme".to_string()).into_response();
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            req.extensions_mut().insert(data.claims);
            next.run(req).await
        }
        Err(_) => Error::Unauthorized("Invalid token".to_string()).into_response(),
    }
}

/// Child identity for child-scoped operations, taken from the `X-Child-Id`
/// header. Row-level authorization stays with the store; the handlers only
/// require that the header names a child.
pub struct ChildId(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ChildId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CHILD_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Validation("X-Child-Id header required".to_string()))?;
        Uuid::parse_str(raw)
            .map(ChildId)
            .map_err(|_| Error::Validation("X-Child-Id must be a valid UUID".to_string()))
    }
}

/// Same header, but absence is fine (e.g. `GET /books/:id` without progress).
pub struct OptionalChildId(pub Option<Uuid>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalChildId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(CHILD_ID_HEADER) {
            None => Ok(OptionalChildId(None)),
            Some(v) => {
                let raw = v
                    .to_str()
                    .map_err(|_| Error::Validation("X-Child-Id must be a valid UUID".to_string()))?;
                Uuid::parse_str(raw)
                    .map(|id| OptionalChildId(Some(id)))
                    .map_err(|_| Error::Validation("X-Child-Id must be a valid UUID".to_string()))
            }
        }
    }
}
