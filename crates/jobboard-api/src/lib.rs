//! Axum HTTP API server for the job board.
//!
//! This crate provides:
//! - Firebase ID token verification and role-based access rules
//! - Company, job, application and profile endpoints
//! - Admin moderation, audit log, dashboard stats and exports
//! - Rate limiting, security headers and localized error bodies
//! - Prometheus metrics

pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod i18n;
pub mod metrics;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;
pub mod store;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
