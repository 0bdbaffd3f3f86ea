//! Firestore REST API client for the job board.
//!
//! This crate provides:
//! - A REST client with token caching, retry and metrics
//! - Emulator support through `FIRESTORE_EMULATOR_HOST`
//! - A structured query builder
//! - Typed repositories for jobs, applications, companies, profiles,
//!   the audit log and reference lists

pub mod application_repo;
pub mod audit_repo;
pub mod client;
pub mod company_repo;
pub mod error;
pub mod job_repo;
pub mod metrics;
pub mod profile_repo;
pub mod query;
pub mod retry;
pub mod token_cache;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use application_repo::ApplicationRepository;
pub use audit_repo::{AuditRepository, ReferenceRepository};
pub use client::{FirestoreClient, FirestoreConfig};
pub use company_repo::CompanyRepository;
pub use error::{FirestoreError, FirestoreResult};
pub use job_repo::JobRepository;
pub use profile_repo::ProfileRepository;
pub use query::{QueryBuilder, SortDirection};
pub use retry::RetryConfig;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
