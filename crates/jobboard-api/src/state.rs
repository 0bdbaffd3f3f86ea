//! Application state.

use std::sync::Arc;

use tracing::info;

use jobboard_firestore::FirestoreClient;
use jobboard_storage::R2Client;

use crate::auth::{IdentityVerifier, JwksCache};
use crate::blob::{BlobStore, MemoryBlobStore};
use crate::config::{ApiConfig, DataBackend};
use crate::services::{
    AdminService, ApplicationService, AuditLog, CompanyService, ExportService, JobService, ProfileService,
    ReferenceService, StatsService,
};
use crate::store::{FirestoreStore, MemoryStore, Store};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn Store>,
    pub blobs: Arc<dyn BlobStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub profiles: ProfileService,
    pub companies: CompanyService,
    pub jobs: JobService,
    pub applications: ApplicationService,
    pub admin: AdminService,
    pub stats: StatsService,
    pub exports: ExportService,
    pub references: ReferenceService,
}

impl AppState {
    /// Create application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| anyhow::anyhow!("GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set"))?;
        let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwksCache::new(project_id).await?);

        let (store, blobs): (Arc<dyn Store>, Arc<dyn BlobStore>) = match config.data_backend {
            DataBackend::Firestore => {
                let firestore = FirestoreClient::from_env().await?;
                let storage = R2Client::from_env().await?;
                (Arc::new(FirestoreStore::new(firestore)), Arc::new(storage))
            }
            DataBackend::Memory => {
                info!("Using in-memory store; data is lost on restart");
                (Arc::new(MemoryStore::new()), Arc::new(MemoryBlobStore::new()))
            }
        };

        Ok(Self::from_parts(config, store, blobs, verifier))
    }

    /// Wire services over already-built backends.
    pub fn from_parts(
        config: ApiConfig,
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let audit = AuditLog::new(Arc::clone(&store));
        let ttl = config.presign_ttl;

        let companies = CompanyService::new(Arc::clone(&store), Arc::clone(&blobs), audit.clone(), ttl);
        let jobs = JobService::new(Arc::clone(&store), audit.clone());
        let applications = ApplicationService::new(Arc::clone(&store));
        let admin = AdminService::new(
            Arc::clone(&store),
            jobs.clone(),
            companies.clone(),
            applications.clone(),
            audit,
        );

        Self {
            profiles: ProfileService::new(Arc::clone(&store), Arc::clone(&blobs), ttl),
            companies,
            jobs,
            applications,
            admin,
            stats: StatsService::new(Arc::clone(&store)),
            exports: ExportService::new(Arc::clone(&store)),
            references: ReferenceService::new(Arc::clone(&store)),
            config,
            store,
            blobs,
            verifier,
        }
    }
}
