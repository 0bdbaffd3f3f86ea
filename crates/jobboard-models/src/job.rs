//! Job postings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::ParseEnumError;
use crate::ids::{CompanyId, JobId};

/// Default currency when a posting does not name one.
pub const DEFAULT_SALARY_CURRENCY: &str = "USD";

/// Publication status of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Being written by the employer, invisible to the public
    #[default]
    Draft,
    /// Submitted, waiting for an admin
    PendingApproval,
    /// Visible and accepting applications
    Published,
    /// Visible, no longer accepting applications
    Closed,
    /// Retired for good
    Archived,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Draft,
        JobStatus::PendingApproval,
        JobStatus::Published,
        JobStatus::Closed,
        JobStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::PendingApproval => "pending_approval",
            JobStatus::Published => "published",
            JobStatus::Closed => "closed",
            JobStatus::Archived => "archived",
        }
    }

    /// Terminal statuses accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Archived)
    }

    /// Statuses anyone may read.
    pub fn is_public(&self) -> bool {
        matches!(self, JobStatus::Published | JobStatus::Closed)
    }

    /// Statuses in which the owner may still edit the posting.
    pub fn is_editable(&self) -> bool {
        matches!(self, JobStatus::Draft | JobStatus::PendingApproval)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(JobStatus::Draft),
            "pending_approval" => Ok(JobStatus::PendingApproval),
            "published" => Ok(JobStatus::Published),
            "closed" => Ok(JobStatus::Closed),
            "archived" => Ok(JobStatus::Archived),
            other => Err(ParseEnumError::new("job status", other)),
        }
    }
}

/// Employment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
            EmploymentType::Temporary => "temporary",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmploymentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_time" => Ok(EmploymentType::FullTime),
            "part_time" => Ok(EmploymentType::PartTime),
            "contract" => Ok(EmploymentType::Contract),
            "internship" => Ok(EmploymentType::Internship),
            "temporary" => Ok(EmploymentType::Temporary),
            other => Err(ParseEnumError::new("employment type", other)),
        }
    }
}

/// Seniority the posting targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Junior,
    #[default]
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(ExperienceLevel::Entry),
            "junior" => Ok(ExperienceLevel::Junior),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            "lead" => Ok(ExperienceLevel::Lead),
            "executive" => Ok(ExperienceLevel::Executive),
            other => Err(ParseEnumError::new("experience level", other)),
        }
    }
}

/// A job posting as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub id: JobId,
    /// Owning company
    pub company_id: CompanyId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: JobStatus,
    /// Reason given by an admin when sending the posting back to draft
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set only by a transition to `published`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Build a new posting from validated input.
    pub fn from_input(company_id: CompanyId, input: JobInput, status: JobStatus, now: DateTime<Utc>) -> Self {
        let mut job = Self {
            id: JobId::new(),
            company_id,
            title: String::new(),
            description: String::new(),
            requirements: None,
            location_id: None,
            employment_type: EmploymentType::default(),
            experience_level: ExperienceLevel::default(),
            salary_min: None,
            salary_max: None,
            salary_currency: DEFAULT_SALARY_CURRENCY.to_string(),
            application_deadline: None,
            status,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            published_at: None,
        };
        job.apply_input(input, now);
        job
    }

    /// Overwrite the editable fields.
    pub fn apply_input(&mut self, input: JobInput, now: DateTime<Utc>) {
        self.title = input.title.trim().to_string();
        self.description = input.description.trim().to_string();
        self.requirements = input.requirements.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        self.location_id = input.location_id.filter(|l| !l.is_empty());
        self.employment_type = input.employment_type;
        self.experience_level = input.experience_level;
        self.salary_min = input.salary_min;
        self.salary_max = input.salary_max;
        self.salary_currency = input
            .salary_currency
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_SALARY_CURRENCY.to_string());
        self.application_deadline = input.application_deadline;
        self.updated_at = now;
    }

    /// Whether a new application may be submitted at `now`.
    pub fn accepts_applications(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Published
            && self.application_deadline.map_or(true, |deadline| now <= deadline)
    }

    /// Upper end of the advertised range, used for salary sorting and filtering.
    pub fn salary_ceiling(&self) -> Option<i64> {
        self.salary_max.or(self.salary_min)
    }
}

/// Editable fields of a job posting.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_salary_range"))]
pub struct JobInput {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 20, max = 20000))]
    pub description: String,
    #[validate(length(max = 10000))]
    pub requirements: Option<String>,
    #[validate(length(max = 64))]
    pub location_id: Option<String>,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    #[validate(range(min = 0, max = 100_000_000))]
    pub salary_min: Option<i64>,
    #[validate(range(min = 0, max = 100_000_000))]
    pub salary_max: Option<i64>,
    #[validate(length(equal = 3))]
    pub salary_currency: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
}

fn validate_salary_range(input: &JobInput) -> Result<(), ValidationError> {
    match (input.salary_min, input.salary_max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("salary_range")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> JobInput {
        JobInput {
            title: "  Backend Engineer ".to_string(),
            description: "Build and run the services behind the board.".to_string(),
            requirements: Some("   ".to_string()),
            location_id: None,
            employment_type: EmploymentType::FullTime,
            experience_level: ExperienceLevel::Senior,
            salary_min: Some(90_000),
            salary_max: Some(120_000),
            salary_currency: Some("eur".to_string()),
            application_deadline: None,
        }
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("open".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_from_input_normalizes_fields() {
        let now = Utc::now();
        let job = Job::from_input(CompanyId::from("c1"), input(), JobStatus::Draft, now);
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.requirements, None);
        assert_eq!(job.salary_currency, "EUR");
        assert_eq!(job.published_at, None);
        assert_eq!(job.created_at, now);
    }

    #[test]
    fn test_salary_range_validation() {
        let mut bad = input();
        bad.salary_min = Some(200_000);
        assert!(bad.validate().is_err());
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_short_title_is_rejected() {
        let mut bad = input();
        bad.title = "AB".to_string();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_deadline_closes_applications() {
        let now = Utc::now();
        let mut job = Job::from_input(CompanyId::from("c1"), input(), JobStatus::Published, now);
        assert!(job.accepts_applications(now));
        job.application_deadline = Some(now - chrono::Duration::days(1));
        assert!(!job.accepts_applications(now));
        job.application_deadline = None;
        job.status = JobStatus::Closed;
        assert!(!job.accepts_applications(now));
    }
}
