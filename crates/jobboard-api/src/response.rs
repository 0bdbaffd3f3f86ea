//! Success envelope: `{ "success": true, "data": ... }`.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub type Envelope<T> = Json<ApiResponse<T>>;

pub fn ok<T: Serialize>(data: T) -> Envelope<T> {
    Json(ApiResponse { success: true, data })
}

/// Body of actions that return nothing.
#[derive(Debug, Serialize)]
pub struct Done {
    pub id: String,
}

impl Done {
    pub fn new(id: impl ToString) -> Self {
        Self { id: id.to_string() }
    }
}
