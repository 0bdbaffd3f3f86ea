//! Read-only reference lists.

use axum::extract::{Path, State};

use jobboard_models::ReferenceItem;

use crate::error::ApiResult;
use crate::response::{ok, Envelope};
use crate::state::AppState;

pub async fn list_references(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Envelope<Vec<ReferenceItem>>> {
    Ok(ok(state.references.list(&kind).await?))
}
