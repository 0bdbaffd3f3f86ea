//! Admin audit trail writer.

use std::sync::Arc;

use tracing::{info, warn};

use jobboard_models::AuditEntry;

use crate::metrics;
use crate::store::Store;

/// Appends audit entries after admin mutations.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn Store>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record an applied mutation. A failed append is logged, never returned:
    /// the mutation itself has already been written.
    pub async fn record(&self, entry: AuditEntry) {
        metrics::record_admin_action(entry.action.as_str());
        match self.store.append_audit(&entry).await {
            Ok(()) => info!(
                actor = %entry.actor_id,
                action = %entry.action,
                target = %entry.target_id,
                "Audit entry recorded"
            ),
            Err(e) => warn!(
                actor = %entry.actor_id,
                action = %entry.action,
                target = %entry.target_id,
                error = %e,
                "Failed to record audit entry"
            ),
        }
    }
}
