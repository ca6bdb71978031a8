//! API error responses
//!
//! The single place where domain failures are translated to transport
//! statuses. Every error leaving the API has the same JSON shape,
//! `{"error": "<CODE>"}`: domain codes for business failures,
//! `INVALID_REQUEST` for request-shape failures, `INTERNAL_ERROR` for
//! unexpected technical failures and `HTTP_<status>` for generic
//! routing failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::DomainError;

/// Wire shape of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Stable error code, e.g. `VEHICLE_ALREADY_RESERVED`.
    pub error: String,
}

/// An error ready to leave the API layer.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: String,
}

impl ApiError {
    /// Request-shape failure (malformed JSON, blank required field).
    pub fn invalid_request() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_REQUEST".to_string(),
        }
    }

    /// Unexpected technical failure.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
        }
    }

    /// Generic routing failure (unknown path, method not allowed).
    pub fn http(status: StatusCode) -> Self {
        Self {
            status,
            code: format!("HTTP_{}", status.as_u16()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match err {
            DomainError::StationNotFound
            | DomainError::VehicleNotFound
            | DomainError::ReservationNotFound => StatusCode::NOT_FOUND,
            DomainError::NotAuthorized => StatusCode::FORBIDDEN,
            // Every remaining code describes a state conflict.
            _ => StatusCode::CONFLICT,
        };
        Self {
            status,
            code: err.code().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.code })).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes_map_to_404() {
        for err in [
            DomainError::StationNotFound,
            DomainError::VehicleNotFound,
            DomainError::ReservationNotFound,
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn authorization_maps_to_403_and_conflicts_to_409() {
        assert_eq!(
            ApiError::from(DomainError::NotAuthorized).status(),
            StatusCode::FORBIDDEN
        );
        for err in [
            DomainError::VehicleAlreadyReserved,
            DomainError::StationFull,
            DomainError::RentalMismatch,
            DomainError::ReservationAlreadyConsumed,
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn codes_pass_through_unchanged() {
        let err = ApiError::from(DomainError::VehicleInUseByOtherRental);
        assert_eq!(err.code(), "VEHICLE_IN_USE_BY_OTHER_RENTAL");
        assert_eq!(ApiError::http(StatusCode::NOT_FOUND).code(), "HTTP_404");
        assert_eq!(ApiError::invalid_request().code(), "INVALID_REQUEST");
    }
}
