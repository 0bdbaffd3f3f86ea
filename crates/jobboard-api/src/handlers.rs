//! Request handlers.
//!
//! Handlers extract, call one service method and wrap the result in the
//! success envelope.

pub mod admin;
pub mod applications;
pub mod companies;
pub mod export;
pub mod health;
pub mod jobs;
pub mod profile;
pub mod references;
pub mod stats;

pub use health::*;

use crate::error::{ApiError, ApiResult};
use crate::security::is_valid_id;

/// Typed id from a path segment.
pub(crate) fn path_id<T: From<String>>(raw: String) -> ApiResult<T> {
    if is_valid_id(&raw) {
        Ok(T::from(raw))
    } else {
        Err(ApiError::invalid_field("id"))
    }
}
