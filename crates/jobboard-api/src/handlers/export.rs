//! Admin data export as a file download.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use serde::Deserialize;

use jobboard_models::export::{ExportEntity, ExportFormat};

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::extract::QueryParams;
use crate::i18n::Message;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// `csv` (default) or `json`
    pub format: Option<String>,
}

/// `GET /api/admin/export/:entity?format=csv|json`
pub async fn export_data(
    State(state): State<AppState>,
    session: Session,
    Path(entity): Path<String>,
    QueryParams(params): QueryParams<ExportParams>,
) -> ApiResult<impl IntoResponse> {
    let entity: ExportEntity = entity
        .parse()
        .map_err(|_| ApiError::validation(Message::UnknownExportEntity))?;
    let format = match params.format.as_deref() {
        Some(raw) => raw
            .parse::<ExportFormat>()
            .map_err(|_| ApiError::validation(Message::UnknownExportFormat))?,
        None => ExportFormat::default(),
    };

    let file = state.exports.export(&session.principal, entity, format).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [(CONTENT_TYPE, file.content_type.to_string()), (CONTENT_DISPOSITION, disposition)],
        file.body,
    ))
}
