//! Validated JSON extractor
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value. Both
//! parse and validation failures reject with
//! `400 {"error":"INVALID_REQUEST"}`, so malformed requests never reach
//! the domain. The offending detail is logged, not echoed back.

use axum::extract::FromRequest;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use super::error::ApiError;

/// An extractor that deserializes JSON and validates it.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct ReserveRequest {
///     #[validate(custom(function = not_blank))]
///     vehicle_id: String,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<ReserveRequest>) {
///     // `body` passed validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            debug!(error = %e, "Rejected malformed JSON body");
            ApiError::invalid_request()
        })?;

        value.validate().map_err(|e| {
            debug!(error = %e, "Rejected invalid request body");
            ApiError::invalid_request()
        })?;

        Ok(ValidatedJson(value))
    }
}

/// `validator` helper: rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::Service;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(custom(function = not_blank))]
        name: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ValidatedJson(body): ValidatedJson<TestBody>| async move { body.name }),
        )
    }

    async fn send(json: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap();
        let mut svc = app().into_service();
        let response = svc.call(request).await.unwrap();
        response.status()
    }

    #[tokio::test]
    async fn valid_body_passes() {
        assert_eq!(send(r#"{"name":"V123"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn blank_field_is_rejected_with_400() {
        assert_eq!(send(r#"{"name":"   "}"#).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_with_400() {
        assert_eq!(send(r#"{"name":"#).await, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_blank_accepts_real_content() {
        assert!(not_blank(" V1 ").is_ok());
        assert!(not_blank("").is_err());
    }
}
