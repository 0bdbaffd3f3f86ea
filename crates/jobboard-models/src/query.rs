//! Pagination, list filters and in-memory sorting.
//!
//! Equality filters travel to the store as `*Filter` values. Free-text search
//! and range filters are applied to the fetched rows with the `matches`
//! helpers on the list queries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationStatus;
use crate::company::Company;
use crate::ids::{CompanyId, JobId, UserId};
use crate::job::{EmploymentType, ExperienceLevel, Job, JobStatus};
use crate::profile::{Profile, UserRole};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Normalized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Apply defaults and clamp `per_page` to `1..=MAX_PER_PAGE`.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cut a page out of an already filtered and sorted list.
    pub fn from_rows(rows: Vec<T>, pagination: Pagination) -> Self {
        let total = rows.len() as u64;
        let total_pages = total.div_ceil(pagination.per_page as u64) as u32;
        let items = rows
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page as usize)
            .collect();
        Self {
            items,
            page: pagination.page,
            per_page: pagination.per_page,
            total,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Case-insensitive substring match; an empty needle matches everything.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ============================================================================
// Store-side filters
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub company_id: Option<CompanyId>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    /// Restrict to applications for any of these jobs
    pub job_ids: Option<Vec<JobId>>,
    pub applicant_id: Option<UserId>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    pub owner_id: Option<UserId>,
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFilter {
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

// ============================================================================
// List queries
// ============================================================================

/// Sort order for job lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobSort {
    #[default]
    Newest,
    Oldest,
    SalaryHigh,
    SalaryLow,
}

/// Query string of job lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub company_id: Option<CompanyId>,
    /// Ignored on the public list, which is always `published`
    pub status: Option<JobStatus>,
    pub location_id: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
    /// Minimum acceptable salary; matches postings whose range reaches it
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub sort: JobSort,
}

impl JobListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn filter(&self) -> JobFilter {
        JobFilter {
            company_id: self.company_id.clone(),
            status: self.status,
        }
    }

    /// In-memory part of the filter.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(term) = search_term(&self.search) {
            let hit = contains_ci(&job.title, term) || contains_ci(&job.description, term);
            if !hit {
                return false;
            }
        }
        if let Some(location) = &self.location_id {
            if job.location_id.as_ref() != Some(location) {
                return false;
            }
        }
        if let Some(kind) = self.employment_type {
            if job.employment_type != kind {
                return false;
            }
        }
        if let Some(level) = self.experience_level {
            if job.experience_level != level {
                return false;
            }
        }
        if let Some(floor) = self.salary_min {
            match job.salary_ceiling() {
                Some(ceiling) if ceiling >= floor => {}
                _ => return false,
            }
        }
        true
    }

    /// Filter, sort and paginate fetched rows.
    pub fn apply(&self, jobs: Vec<Job>) -> Page<Job> {
        let mut jobs: Vec<Job> = jobs.into_iter().filter(|job| self.matches(job)).collect();
        sort_jobs(&mut jobs, self.sort);
        Page::from_rows(jobs, self.pagination())
    }
}

/// Sort jobs in place. Jobs without a salary sort last for salary orders.
pub fn sort_jobs(jobs: &mut [Job], sort: JobSort) {
    let listed_at = |job: &Job| job.published_at.unwrap_or(job.created_at);
    match sort {
        JobSort::Newest => jobs.sort_by(|a, b| listed_at(b).cmp(&listed_at(a))),
        JobSort::Oldest => jobs.sort_by_key(|job| listed_at(job)),
        JobSort::SalaryHigh => jobs.sort_by(|a, b| match (a.salary_ceiling(), b.salary_ceiling()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => listed_at(b).cmp(&listed_at(a)),
        }),
        JobSort::SalaryLow => jobs.sort_by(|a, b| {
            let floor = |job: &Job| job.salary_min.or(job.salary_max);
            match (floor(a), floor(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => listed_at(b).cmp(&listed_at(a)),
            }
        }),
    }
}

/// Query string of application lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

/// Query string of company lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub industry_id: Option<String>,
    /// Honored for admins only
    pub verified: Option<bool>,
}

impl CompanyListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn matches(&self, company: &Company) -> bool {
        if let Some(term) = search_term(&self.search) {
            if !contains_ci(&company.name, term) {
                return false;
            }
        }
        match &self.industry_id {
            Some(industry) => company.industry_id.as_ref() == Some(industry),
            None => true,
        }
    }
}

/// Query string of the admin user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
    pub search: Option<String>,
}

impl UserListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn filter(&self) -> ProfileFilter {
        ProfileFilter {
            role: self.role,
            active: self.active,
        }
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let Some(term) = search_term(&self.search) else {
            return true;
        };
        profile.email.as_deref().is_some_and(|email| contains_ci(email, term))
            || profile.full_name.as_deref().is_some_and(|name| contains_ci(name, term))
    }
}

/// Query string of the audit log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl AuditListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}
