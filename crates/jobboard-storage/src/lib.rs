//! Cloudflare R2 storage client.
//!
//! This crate provides:
//! - Byte uploads for resumes and company logos
//! - Presigned GET URLs
//! - Object deletion
//! - Object key layout and upload validation

pub mod client;
pub mod error;
pub mod objects;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use objects::{normalize_content_type, object_key, validate_upload, UploadKind};
