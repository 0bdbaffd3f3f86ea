//! Shared data models for the job board backend.
//!
//! This crate is pure: no I/O, no clocks. It provides:
//! - Entities (jobs, applications, companies, profiles, audit entries)
//! - Status transition rules for jobs and applications
//! - The authorization gate
//! - Pagination, list filters and sorting
//! - Dashboard aggregation and CSV/JSON export

pub mod application;
pub mod audit;
pub mod authz;
pub mod company;
pub mod error;
pub mod export;
pub mod ids;
pub mod job;
pub mod profile;
pub mod query;
pub mod stats;
pub mod status;

// Re-export common types
pub use application::{Application, ApplicationStatus};
pub use audit::{AuditAction, AuditEntry, TargetType};
pub use authz::{AccessDenied, Caller, Principal, Resource, Tier};
pub use company::{Company, CompanyInput, ReferenceItem, ReferenceKind};
pub use error::ParseEnumError;
pub use ids::{ApplicationId, CompanyId, JobId, UserId};
pub use job::{EmploymentType, ExperienceLevel, Job, JobInput, JobStatus};
pub use profile::{Profile, UserRole};
pub use query::{Page, Pagination};
pub use status::{ApplicationActor, JobActor, TransitionError};
