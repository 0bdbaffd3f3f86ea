//! Job applications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ParseEnumError;
use crate::ids::{ApplicationId, JobId, UserId};

/// Review status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Interviewing,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Still in the hiring pipeline.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::Reviewing | ApplicationStatus::Interviewing
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewing" => Ok(ApplicationStatus::Reviewing),
            "interviewing" => Ok(ApplicationStatus::Interviewing),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(ParseEnumError::new("application status", other)),
        }
    }
}

/// An application as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    /// Row owner for self-service checks
    pub applicant_id: UserId,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    /// Object key of the resume attached at submission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<String>,
    /// Reviewer notes, never shown to the applicant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Create a pending application.
    pub fn new(
        job_id: JobId,
        applicant_id: UserId,
        cover_letter: Option<String>,
        resume_path: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ApplicationId::for_pair(&job_id, &applicant_id),
            job_id,
            applicant_id,
            status: ApplicationStatus::Pending,
            cover_letter: cover_letter.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            resume_path,
            notes: None,
            created_at: now,
            updated_at: now,
            reviewed_at: None,
        }
    }

    /// Copy without reviewer-only fields.
    pub fn for_applicant(mut self) -> Self {
        self.notes = None;
        self
    }
}

/// Body of an application submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplyRequest {
    #[validate(length(max = 5000))]
    pub cover_letter: Option<String>,
}

/// Body of a status change.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplicationStatusRequest {
    pub status: ApplicationStatus,
}

/// Body of a notes update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplicationNotesRequest {
    #[validate(length(max = 5000))]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        let active: Vec<_> = ApplicationStatus::ALL.iter().filter(|s| s.is_active()).collect();
        assert_eq!(active.len(), 3);
        assert!(ApplicationStatus::Accepted.is_terminal());
        assert!(ApplicationStatus::Withdrawn.is_terminal());
    }

    #[test]
    fn test_new_application_is_pending() {
        let app = Application::new(
            JobId::from("j1"),
            UserId::from("u1"),
            Some("  ".to_string()),
            None,
            Utc::now(),
        );
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.id.as_str(), "j1_u1");
        assert_eq!(app.cover_letter, None);
    }

    #[test]
    fn test_for_applicant_hides_notes() {
        let mut app = Application::new(JobId::from("j1"), UserId::from("u1"), None, None, Utc::now());
        app.notes = Some("strong candidate".to_string());
        assert_eq!(app.for_applicant().notes, None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("interviewing".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Interviewing);
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }
}
