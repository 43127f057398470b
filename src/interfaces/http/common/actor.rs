//! Acting role and company from request headers

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ApiResponse;
use crate::domain::{Actor, ActorRole};

pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const COMPANY_ID_HEADER: &str = "x-company-id";

/// Extracts the [`Actor`] performing a request.
///
/// `X-Actor-Role` is required (ADMIN, ESTACIONAMENTO or TRANSPORTADORA);
/// `X-Company-Id` scopes the actor to one company.
pub struct ActorHeaders(pub Actor);

fn reject(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

impl<S> FromRequestParts<S> for ActorHeaders
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw_role = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "missing X-Actor-Role header".into()))?;
        let role: ActorRole = raw_role
            .parse()
            .map_err(|e: crate::domain::DomainError| reject(StatusCode::UNAUTHORIZED, e.to_string()))?;

        let company_id = match parts.headers.get(COMPANY_ID_HEADER) {
            Some(value) => Some(
                value
                    .to_str()
                    .ok()
                    .and_then(|v| v.trim().parse::<i32>().ok())
                    .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "invalid X-Company-Id header".into()))?,
            ),
            None => None,
        };

        Ok(Self(Actor { role, company_id }))
    }
}
