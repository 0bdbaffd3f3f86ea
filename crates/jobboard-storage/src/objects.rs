//! Object key layout and upload validation.
//!
//! Keys are namespaced by kind and owner:
//! - `resumes/<uid>/resume-<millis>.<ext>`
//! - `logos/<company_id>/logo-<millis>.<ext>`
//!
//! A fresh key per upload means a previously issued presigned URL never
//! serves the replacement file.

use chrono::{DateTime, Utc};

use crate::error::{StorageError, StorageResult};

const MIB: usize = 1024 * 1024;

const RESUME_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("application/msword", "doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
];

const LOGO_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/webp", "webp"),
];

/// What an uploaded object is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Logo,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resume",
            UploadKind::Logo => "logo",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Logo => "logos",
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            UploadKind::Resume => 5 * MIB,
            UploadKind::Logo => 2 * MIB,
        }
    }

    fn allowed_types(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            UploadKind::Resume => RESUME_TYPES,
            UploadKind::Logo => LOGO_TYPES,
        }
    }

    /// Whether `key` lives under this kind's prefix for `owner`.
    pub fn owns_key(&self, owner: &str, key: &str) -> bool {
        key.strip_prefix(self.prefix())
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| rest.strip_prefix(owner))
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Lowercase the MIME type and drop any parameters.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check type and size, returning the file extension to store under.
pub fn validate_upload(kind: UploadKind, content_type: &str, size: usize) -> StorageResult<&'static str> {
    if size == 0 {
        return Err(StorageError::Empty);
    }
    if size > kind.max_bytes() {
        return Err(StorageError::TooLarge {
            size,
            limit: kind.max_bytes(),
        });
    }

    let normalized = normalize_content_type(content_type);
    kind.allowed_types()
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| StorageError::UnsupportedType {
            kind: kind.as_str(),
            content_type: normalized,
        })
}

pub fn object_key(kind: UploadKind, owner: &str, ext: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}-{}.{}",
        kind.prefix(),
        owner,
        kind.as_str(),
        now.timestamp_millis(),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resume_types() {
        assert_eq!(validate_upload(UploadKind::Resume, "application/pdf", 10).unwrap(), "pdf");
        assert_eq!(
            validate_upload(
                UploadKind::Resume,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                10
            )
            .unwrap(),
            "docx"
        );
        assert!(matches!(
            validate_upload(UploadKind::Resume, "image/png", 10),
            Err(StorageError::UnsupportedType { kind: "resume", .. })
        ));
    }

    #[test]
    fn test_content_type_parameters_are_ignored() {
        assert_eq!(validate_upload(UploadKind::Logo, "Image/PNG; charset=binary", 10).unwrap(), "png");
    }

    #[test]
    fn test_size_limits() {
        assert!(validate_upload(UploadKind::Resume, "application/pdf", 5 * MIB).is_ok());
        assert!(matches!(
            validate_upload(UploadKind::Resume, "application/pdf", 5 * MIB + 1),
            Err(StorageError::TooLarge { limit, .. }) if limit == 5 * MIB
        ));
        assert!(validate_upload(UploadKind::Logo, "image/webp", 3 * MIB).is_err());
        assert!(matches!(
            validate_upload(UploadKind::Logo, "image/webp", 0),
            Err(StorageError::Empty)
        ));
    }

    #[test]
    fn test_object_key_layout() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let key = object_key(UploadKind::Resume, "uid-1", "pdf", now);
        assert_eq!(key, format!("resumes/uid-1/resume-{}.pdf", now.timestamp_millis()));
        assert!(UploadKind::Resume.owns_key("uid-1", &key));
        assert!(!UploadKind::Resume.owns_key("uid", &key));
        assert!(!UploadKind::Logo.owns_key("uid-1", &key));
    }
}
