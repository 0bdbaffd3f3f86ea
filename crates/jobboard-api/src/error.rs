//! API error types.
//!
//! Every failure is an [`ApiError`] carrying a [`Message`] key. The response
//! body is rendered in English here; [`crate::middleware::localize_errors`]
//! re-renders it in the caller's language.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use jobboard_firestore::FirestoreError;
use jobboard_models::{AccessDenied, TransitionError};
use jobboard_storage::StorageError;

use crate::i18n::{Lang, Message};
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {message:?} ({field:?})")]
    Validation {
        message: Message,
        field: Option<String>,
    },

    #[error("Unauthorized: {0:?}")]
    Unauthorized(Message),

    #[error("Forbidden: {0:?}")]
    Forbidden(Message),

    #[error("Not found: {0:?}")]
    NotFound(Message),

    #[error("Conflict: {0:?}")]
    Conflict(Message),

    #[error("Dependency: {0:?}")]
    Dependency(Message),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: Message) -> Self {
        Self::Validation { message, field: None }
    }

    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::Validation {
            message: Message::InvalidField,
            field: Some(field.into()),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::Dependency(_) => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Dependency(_) => "dependency",
            ApiError::RateLimited => "rate_limited",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn message(&self) -> Message {
        match self {
            ApiError::Validation { message, .. } => *message,
            ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::Dependency(m) => *m,
            ApiError::RateLimited => Message::RateLimited,
            ApiError::Internal(_) => Message::Internal,
        }
    }

    fn payload(&self) -> ErrorPayload {
        // Don't expose internal error details in production
        let detail = match self {
            ApiError::Internal(detail) if std::env::var("ENVIRONMENT").unwrap_or_default() != "production" => {
                Some(detail.clone())
            }
            _ => None,
        };
        let field = match self {
            ApiError::Validation { field, .. } => field.clone(),
            _ => None,
        };
        ErrorPayload {
            message: self.message(),
            code: self.code(),
            field,
            detail,
        }
    }
}

/// Error details kept on the response so the body can be re-rendered per language.
#[derive(Debug, Clone)]
pub struct ErrorPayload {
    pub message: Message,
    pub code: &'static str,
    pub field: Option<String>,
    pub detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl ErrorPayload {
    pub fn render(&self, status: StatusCode, lang: Lang) -> Response {
        let error = match &self.field {
            Some(field) => format!("{}: {}", self.message.text(lang), field),
            None => self.message.text(lang).to_string(),
        };
        let body = ErrorBody {
            success: false,
            error,
            code: self.code,
            field: self.field.as_deref(),
            detail: self.detail.as_deref(),
        };
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self.clone());
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.payload().render(self.status_code(), Lang::En)
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => ApiError::Unauthorized(Message::AuthRequired),
            AccessDenied::Inactive => ApiError::Forbidden(Message::AccountInactive),
            AccessDenied::Row(resource) => ApiError::Forbidden(Message::RowDenied(resource)),
            AccessDenied::Role(_) => ApiError::Forbidden(Message::RoleNotAllowed),
            AccessDenied::AdminOnly => ApiError::Forbidden(Message::AdminOnly),
            AccessDenied::SelfProtection => ApiError::Forbidden(Message::SelfProtection),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Unchanged { .. } => ApiError::Conflict(Message::StatusUnchanged),
            TransitionError::NotAllowed { .. } => ApiError::Conflict(Message::TransitionNotAllowed),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(_) => ApiError::Conflict(Message::AlreadyExists),
            StoreError::NotFound(_) => ApiError::NotFound(Message::RowGone),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<FirestoreError> for ApiError {
    fn from(err: FirestoreError) -> Self {
        StoreError::from(err).into()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedType { .. } => ApiError::validation(Message::UnsupportedFileType),
            StorageError::TooLarge { .. } => ApiError::validation(Message::FileTooLarge),
            StorageError::Empty => ApiError::validation(Message::EmptyFile),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard_models::Resource;

    #[test]
    fn test_missing_and_foreign_rows_map_identically() {
        let missing: ApiError = AccessDenied::Row(Resource::Job).into();
        let foreign: ApiError = AccessDenied::Row(Resource::Job).into();
        assert_eq!(missing.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(missing.code(), foreign.code());
        assert_eq!(missing.message(), foreign.message());
    }

    #[test]
    fn test_status_codes_follow_error_kind() {
        assert_eq!(ApiError::invalid_field("title").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AccessDenied::Unauthenticated).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound(Message::UserNotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict(Message::AlreadyApplied).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Dependency(Message::CompanyHasPublishedJobs).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_row_vanished_before_save_is_not_found() {
        let err: ApiError = StoreError::NotFound("jobs/j1".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), Message::RowGone);

        let err: ApiError = StoreError::Backend("timeout".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_transition_errors_are_conflicts() {
        let err: ApiError = TransitionError::Unchanged {
            entity: "job",
            status: "draft",
        }
        .into();
        assert_eq!(err.code(), "conflict");
        assert_eq!(err.message(), Message::StatusUnchanged);
    }

    #[test]
    fn test_rejected_uploads_are_validation_errors() {
        let err: ApiError = StorageError::TooLarge { size: 10, limit: 5 }.into();
        assert_eq!(err.code(), "validation_error");
        let err: ApiError = StorageError::upload_failed("network").into();
        assert_eq!(err.code(), "internal_error");
    }
}
