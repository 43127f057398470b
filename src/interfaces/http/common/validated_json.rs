//! JSON body extractor that also runs `validator` checks
//!
//! Both a body that does not parse and one that fails validation come back
//! as `DomainError::Validation`, so clients see the same 400 envelope as
//! for domain-level rejections.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiError;
use crate::domain::DomainError;

/// `axum::Json<T>` plus `Validate::validate()`
pub struct ValidatedJson<T>(pub T);

/// `field: message` pairs, sorted by field so responses are stable
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let described: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    if described.is_empty() {
        "request body failed validation".to_string()
    } else {
        described.join("; ")
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            DomainError::Validation(format!("invalid JSON body: {}", rejection.body_text()))
        })?;
        body.validate()
            .map_err(|errors| DomainError::Validation(describe(&errors)))?;
        Ok(Self(body))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct PlateBody {
        #[validate(length(min = 1, max = 20))]
        license_plate: String,
        #[validate(range(min = 1))]
        company_id: i32,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<PlateBody>) -> &'static str {
        "ok"
    }

    async fn send(body: Body) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/plates", post(handler));
        let req = Request::builder()
            .method("POST")
            .uri("/plates")
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn json(value: serde_json::Value) -> Body {
        Body::from(serde_json::to_vec(&value).unwrap())
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let (status, _) = send(json(serde_json::json!({"license_plate": "ABC1D23", "company_id": 2}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (status, body) = send(Body::from("{plate")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid JSON body"));
    }

    #[tokio::test]
    async fn failed_validation_names_each_field() {
        let (status, body) = send(json(serde_json::json!({"license_plate": "", "company_id": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("company_id: range"), "{message}");
        assert!(message.contains("license_plate: length"), "{message}");
        assert_eq!(body["success"], false);
    }
}
