//! Lookup lists (industries, locations, company sizes).

use std::sync::Arc;

use jobboard_models::{ReferenceItem, ReferenceKind};

use crate::error::{ApiError, ApiResult};
use crate::i18n::Message;
use crate::store::Store;

#[derive(Clone)]
pub struct ReferenceService {
    store: Arc<dyn Store>,
}

impl ReferenceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Public list for `kind`, which accepts singular or plural names.
    pub async fn list(&self, kind: &str) -> ApiResult<Vec<ReferenceItem>> {
        let kind: ReferenceKind = kind
            .parse()
            .map_err(|_| ApiError::validation(Message::UnknownReferenceKind))?;
        Ok(self.store.list_references(kind).await?)
    }
}
