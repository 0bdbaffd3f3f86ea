//! Append-only audit log and read-only reference lists.

use std::collections::HashMap;

use jobboard_models::{AuditEntry, ReferenceItem, ReferenceKind};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::query::{QueryBuilder, SortDirection};
use crate::types::{Document, ToFirestoreValue, Value};

pub const AUDIT_COLLECTION: &str = "audit_log";

/// Repository for audit entries.
#[derive(Clone)]
pub struct AuditRepository {
    client: FirestoreClient,
}

impl AuditRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn append(&self, entry: &AuditEntry) -> FirestoreResult<()> {
        self.client
            .create_document(AUDIT_COLLECTION, &entry.id, audit_to_fields(entry))
            .await?;
        Ok(())
    }

    /// Most recent entries first.
    pub async fn list(&self, limit: i32) -> FirestoreResult<Vec<AuditEntry>> {
        let query = QueryBuilder::collection(AUDIT_COLLECTION)
            .order_by("created_at", SortDirection::Descending)
            .limit(limit)
            .build();
        self.client
            .run_query("", query)
            .await?
            .iter()
            .map(document_to_audit)
            .collect()
    }
}

/// Repository for lookup lists (industries, locations, company sizes).
#[derive(Clone)]
pub struct ReferenceRepository {
    client: FirestoreClient,
}

impl ReferenceRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, kind: ReferenceKind) -> FirestoreResult<Vec<ReferenceItem>> {
        let query = QueryBuilder::collection(kind.collection())
            .order_by("sort_order", SortDirection::Ascending)
            .build();
        self.client
            .run_query("", query)
            .await?
            .iter()
            .map(|doc| {
                let f = doc.reader()?;
                Ok(ReferenceItem {
                    id: doc.id().unwrap_or_default().to_string(),
                    kind,
                    name: f.string("name"),
                    sort_order: f.opt("sort_order").unwrap_or(0),
                })
            })
            .collect()
    }
}

fn audit_to_fields(entry: &AuditEntry) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("actor_id".to_string(), entry.actor_id.as_str().to_firestore_value());
    fields.insert("action".to_string(), entry.action.as_str().to_firestore_value());
    fields.insert("target_type".to_string(), entry.target_type.as_str().to_firestore_value());
    fields.insert("target_id".to_string(), entry.target_id.to_firestore_value());
    fields.insert("reason".to_string(), entry.reason.to_firestore_value());
    fields.insert("created_at".to_string(), entry.created_at.to_firestore_value());
    fields
}

fn document_to_audit(doc: &Document) -> FirestoreResult<AuditEntry> {
    let f = doc.reader()?;
    Ok(AuditEntry {
        id: doc.id().unwrap_or_default().to_string(),
        actor_id: f.string("actor_id").into(),
        action: f.parse("action")?,
        target_type: f.parse("target_type")?,
        target_id: f.string("target_id"),
        reason: f.opt("reason"),
        created_at: f.req("created_at")?,
    })
}
