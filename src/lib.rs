//! # Station Service
//!
//! Coordinates the physical lifecycle of shared rental vehicles across
//! docking stations: reserving a vehicle, unlocking it for a rental and
//! locking it back at end-of-rental, with per-vehicle serialization of
//! competing requests.
//!
//! ## Architecture
//!
//! - **domain**: entities, the error taxonomy, persistence ports and
//!   the station domain service
//! - **infrastructure**: in-memory stores, the per-vehicle lock manager
//!   and the actuation command channel
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: graceful shutdown support

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use domain::{DomainError, DomainResult, StationService};
pub use interfaces::http::create_api_router;
