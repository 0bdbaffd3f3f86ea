//! Persistence seam.
//!
//! Services talk to a [`Store`]; production uses [`FirestoreStore`], tests and
//! `DATA_BACKEND=memory` runs use [`MemoryStore`]. Lists honor the equality
//! filters and return rows in the same order as the Firestore queries.

mod firestore;
mod memory;

use thiserror::Error;

use jobboard_firestore::FirestoreError;
use jobboard_models::query::{ApplicationFilter, CompanyFilter, JobFilter, ProfileFilter};
use jobboard_models::{
    Application, ApplicationId, AuditEntry, Company, CompanyId, Job, JobId, Profile, ReferenceItem, ReferenceKind,
    UserId,
};

pub use self::firestore::FirestoreStore;
pub use self::memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Row not found: {0}")]
    NotFound(String),

    /// Create on an id that is already taken
    #[error("Row already exists: {0}")]
    AlreadyExists(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<FirestoreError> for StoreError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::NotFound(what) => StoreError::NotFound(what),
            FirestoreError::AlreadyExists(what) => StoreError::AlreadyExists(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Row storage for every collection.
///
/// `create_*` fails with [`StoreError::AlreadyExists`] when the id is taken;
/// `save_*` overwrites an existing row and fails with
/// [`StoreError::NotFound`] otherwise; `delete_*` is idempotent.
#[axum::async_trait]
pub trait Store: Send + Sync {
    async fn get_profile(&self, id: &UserId) -> StoreResult<Option<Profile>>;
    async fn create_profile(&self, profile: &Profile) -> StoreResult<()>;
    async fn save_profile(&self, profile: &Profile) -> StoreResult<()>;
    /// Newest first.
    async fn list_profiles(&self, filter: &ProfileFilter) -> StoreResult<Vec<Profile>>;

    async fn get_company(&self, id: &CompanyId) -> StoreResult<Option<Company>>;
    async fn create_company(&self, company: &Company) -> StoreResult<()>;
    async fn save_company(&self, company: &Company) -> StoreResult<()>;
    async fn delete_company(&self, id: &CompanyId) -> StoreResult<()>;
    /// By name.
    async fn list_companies(&self, filter: &CompanyFilter) -> StoreResult<Vec<Company>>;

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>>;
    async fn create_job(&self, job: &Job) -> StoreResult<()>;
    async fn save_job(&self, job: &Job) -> StoreResult<()>;
    async fn delete_job(&self, id: &JobId) -> StoreResult<()>;
    /// Newest first.
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>>;

    async fn get_application(&self, id: &ApplicationId) -> StoreResult<Option<Application>>;
    async fn create_application(&self, application: &Application) -> StoreResult<()>;
    async fn save_application(&self, application: &Application) -> StoreResult<()>;
    async fn delete_application(&self, id: &ApplicationId) -> StoreResult<()>;
    /// Newest first. An empty `job_ids` set matches nothing.
    async fn list_applications(&self, filter: &ApplicationFilter) -> StoreResult<Vec<Application>>;

    async fn append_audit(&self, entry: &AuditEntry) -> StoreResult<()>;
    /// Newest first, at most `limit` entries.
    async fn list_audit(&self, limit: usize) -> StoreResult<Vec<AuditEntry>>;

    /// By sort order.
    async fn list_references(&self, kind: ReferenceKind) -> StoreResult<Vec<ReferenceItem>>;

    /// Cheap round trip for readiness checks.
    async fn ping(&self) -> StoreResult<()>;
}
