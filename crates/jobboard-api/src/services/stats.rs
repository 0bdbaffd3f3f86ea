//! Dashboard aggregates.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use jobboard_models::query::{ApplicationFilter, CompanyFilter, JobFilter, ProfileFilter};
use jobboard_models::stats::{count_by, month_over_month, monthly_series, series_months, Growth, MonthlyCount};
use jobboard_models::{CompanyId, JobId, Principal, UserRole};

use crate::error::{ApiError, ApiResult};
use crate::i18n::Message;
use crate::store::Store;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    /// Length of the monthly series
    pub months: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct Totals {
    pub users: u64,
    pub companies: u64,
    pub jobs: u64,
    pub applications: u64,
}

#[derive(Debug, Serialize)]
pub struct GrowthStats {
    pub users: Growth,
    pub companies: Growth,
    pub jobs: Growth,
    pub applications: Growth,
}

#[derive(Debug, Serialize)]
pub struct SeriesStats {
    pub months: u32,
    pub users: Vec<MonthlyCount>,
    pub companies: Vec<MonthlyCount>,
    pub jobs: Vec<MonthlyCount>,
    pub applications: Vec<MonthlyCount>,
}

/// Platform-wide numbers for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub totals: Totals,
    pub users_by_role: BTreeMap<String, u64>,
    pub jobs_by_status: BTreeMap<String, u64>,
    pub applications_by_status: BTreeMap<String, u64>,
    pub companies_by_industry: BTreeMap<String, u64>,
    pub growth: GrowthStats,
    pub series: SeriesStats,
}

#[derive(Debug, Serialize)]
pub struct JobApplicationCount {
    pub job_id: JobId,
    pub title: String,
    pub applications: u64,
}

/// Numbers for one employer's company.
#[derive(Debug, Serialize)]
pub struct CompanyStats {
    pub company_id: CompanyId,
    pub jobs_by_status: BTreeMap<String, u64>,
    pub applications_by_status: BTreeMap<String, u64>,
    pub applications_per_job: Vec<JobApplicationCount>,
    pub application_growth: Growth,
}

const UNSPECIFIED_INDUSTRY: &str = "unspecified";

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn Store>,
}

impl StatsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn dashboard(&self, principal: &Principal, query: &StatsQuery) -> ApiResult<DashboardStats> {
        principal.require_admin()?;

        let profiles = self.store.list_profiles(&ProfileFilter::default()).await?;
        let companies = self.store.list_companies(&CompanyFilter::default()).await?;
        let jobs = self.store.list_jobs(&JobFilter::default()).await?;
        let applications = self.store.list_applications(&ApplicationFilter::default()).await?;

        let now = Utc::now();
        let months = series_months(query.months);

        Ok(DashboardStats {
            totals: Totals {
                users: profiles.len() as u64,
                companies: companies.len() as u64,
                jobs: jobs.len() as u64,
                applications: applications.len() as u64,
            },
            users_by_role: count_by(&profiles, |p| p.role.as_str()),
            jobs_by_status: count_by(&jobs, |j| j.status.as_str()),
            applications_by_status: count_by(&applications, |a| a.status.as_str()),
            companies_by_industry: count_by(&companies, |c| {
                c.industry_id.clone().unwrap_or_else(|| UNSPECIFIED_INDUSTRY.to_string())
            }),
            growth: GrowthStats {
                users: month_over_month(profiles.iter().map(|p| p.created_at), now),
                companies: month_over_month(companies.iter().map(|c| c.created_at), now),
                jobs: month_over_month(jobs.iter().map(|j| j.created_at), now),
                applications: month_over_month(applications.iter().map(|a| a.created_at), now),
            },
            series: SeriesStats {
                months,
                users: monthly_series(profiles.iter().map(|p| p.created_at), now, months),
                companies: monthly_series(companies.iter().map(|c| c.created_at), now, months),
                jobs: monthly_series(jobs.iter().map(|j| j.created_at), now, months),
                applications: monthly_series(applications.iter().map(|a| a.created_at), now, months),
            },
        })
    }

    /// Stats for the company the caller owns.
    pub async fn company_stats(&self, principal: &Principal) -> ApiResult<CompanyStats> {
        let caller = principal.require_role(&[UserRole::Employer])?;
        let company = self
            .store
            .list_companies(&CompanyFilter {
                owner_id: Some(caller.id.clone()),
                ..Default::default()
            })
            .await?
            .into_iter()
            .next()
            .ok_or(ApiError::NotFound(Message::NoCompany))?;

        let jobs = self
            .store
            .list_jobs(&JobFilter {
                company_id: Some(company.id.clone()),
                ..Default::default()
            })
            .await?;
        let applications = if jobs.is_empty() {
            Vec::new()
        } else {
            self.store
                .list_applications(&ApplicationFilter {
                    job_ids: Some(jobs.iter().map(|j| j.id.clone()).collect()),
                    ..Default::default()
                })
                .await?
        };

        let per_job = count_by(&applications, |a| a.job_id.as_str().to_string());
        let applications_per_job = jobs
            .iter()
            .map(|job| JobApplicationCount {
                job_id: job.id.clone(),
                title: job.title.clone(),
                applications: per_job.get(job.id.as_str()).copied().unwrap_or(0),
            })
            .collect();

        Ok(CompanyStats {
            company_id: company.id,
            jobs_by_status: count_by(&jobs, |j| j.status.as_str()),
            applications_by_status: count_by(&applications, |a| a.status.as_str()),
            applications_per_job,
            application_growth: month_over_month(applications.iter().map(|a| a.created_at), Utc::now()),
        })
    }
}
