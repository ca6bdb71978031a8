//! HTTP boundary — DTOs, handlers, router and the error contract.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod validated_json;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use router::create_api_router;
pub use validated_json::ValidatedJson;
