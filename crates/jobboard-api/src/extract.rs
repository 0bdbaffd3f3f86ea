//! Request extractors with localized rejections.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Multipart, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;
use crate::i18n::Message;

/// JSON body that has passed its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                tracing::debug!(error = %e, "Rejected JSON body");
                ApiError::validation(Message::InvalidInput)
            })?;
        value.validate().map_err(first_error)?;
        Ok(ValidatedJson(value))
    }
}

/// The first failing field in name order, so the same input always reports
/// the same error.
pub fn first_error(errors: ValidationErrors) -> ApiError {
    let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
    fields.sort();
    match fields.into_iter().next() {
        // Struct-level schema checks are reported under `__all__`
        Some(field) if field == "__all__" => {
            let code = errors
                .field_errors()
                .get("__all__")
                .and_then(|errs| errs.first())
                .map(|e| e.code.to_string())
                .unwrap_or_else(|| "input".to_string());
            ApiError::invalid_field(code)
        }
        Some(field) => ApiError::invalid_field(field),
        None => ApiError::validation(Message::InvalidInput),
    }
}

/// Query string with a localized rejection.
#[derive(Debug, Clone, Default)]
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| {
                tracing::debug!(error = %e, "Rejected query string");
                ApiError::validation(Message::InvalidQuery)
            })?;
        Ok(QueryParams(value))
    }
}

/// A single uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Read the `file` part of a multipart body.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation(Message::InvalidInput))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::validation(Message::FileTooLarge))?;
        return Ok(Upload {
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::validation(Message::MissingFile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 3))]
        title: String,
        #[validate(range(min = 1))]
        amount: i64,
    }

    #[test]
    fn test_first_error_is_alphabetical() {
        let sample = Sample {
            title: "x".into(),
            amount: 0,
        };
        let err = first_error(sample.validate().unwrap_err());
        match err {
            ApiError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("amount")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
