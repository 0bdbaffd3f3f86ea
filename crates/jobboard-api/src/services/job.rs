//! Job postings.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use jobboard_models::authz::{manage_company, manage_job, view_job};
use jobboard_models::query::{ApplicationFilter, JobFilter, JobListQuery};
use jobboard_models::{
    AuditAction, AuditEntry, Caller, Company, CompanyId, Job, JobActor, JobId, JobInput, JobStatus, Page, Principal,
    Resource, TargetType, Tier, UserRole,
};

use crate::error::{ApiError, ApiResult};
use crate::i18n::Message;
use crate::metrics;
use crate::services::audit::AuditLog;
use crate::store::Store;

/// A job with its company's display name.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub company_name: Option<String>,
}

#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn Store>,
    audit: AuditLog,
}

impl JobService {
    pub fn new(store: Arc<dyn Store>, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    /// Create a posting under a company the caller manages.
    ///
    /// Starts as a draft, or goes straight to review when `submit` is set.
    pub async fn create(
        &self,
        principal: &Principal,
        company_id: &CompanyId,
        input: JobInput,
        submit: bool,
    ) -> ApiResult<Job> {
        let caller = principal.require_role(&[UserRole::Employer])?;
        let company = self.store.get_company(company_id).await?;
        let (company, _) = manage_company(caller, company.as_ref()).inspect_err(|_| denied(caller, company_id.as_str()))?;

        let status = if submit {
            JobStatus::PendingApproval
        } else {
            JobStatus::Draft
        };
        let job = Job::from_input(company.id.clone(), input, status, Utc::now());
        self.store.create_job(&job).await?;

        info!(actor = %caller.id, job_id = %job.id, company_id = %company.id, status = %job.status, "Job created");
        Ok(job)
    }

    /// Edit a draft or pending posting. The status is left as it was.
    pub async fn update(&self, principal: &Principal, id: &JobId, input: JobInput) -> ApiResult<Job> {
        let caller = principal.caller()?;
        let (job, company) = self.load(id).await?;
        let (job, _) = manage_job(caller, job.as_ref(), company.as_ref()).inspect_err(|_| denied(caller, id.as_str()))?;

        if !job.status.is_editable() {
            return Err(ApiError::Conflict(Message::JobNotEditable));
        }

        let mut job = job.clone();
        job.apply_input(input, Utc::now());
        self.store.save_job(&job).await?;

        info!(actor = %caller.id, job_id = %id, "Job updated");
        Ok(job)
    }

    /// Send a draft for admin review.
    pub async fn submit(&self, principal: &Principal, id: &JobId) -> ApiResult<Job> {
        let caller = principal.caller()?;
        self.transition(caller, id, JobStatus::PendingApproval, None, false).await.map(|(job, _)| job)
    }

    pub async fn close(&self, principal: &Principal, id: &JobId) -> ApiResult<Job> {
        let caller = principal.caller()?;
        self.transition(caller, id, JobStatus::Closed, None, false).await.map(|(job, _)| job)
    }

    pub async fn archive(&self, principal: &Principal, id: &JobId) -> ApiResult<Job> {
        let caller = principal.caller()?;
        let (job, tier) = self.transition(caller, id, JobStatus::Archived, None, false).await?;
        if tier == Tier::Admin {
            self.audit
                .record(AuditEntry::new(
                    caller.id.clone(),
                    AuditAction::ArchiveJob,
                    TargetType::Job,
                    id.as_str(),
                    Utc::now(),
                ))
                .await;
        }
        Ok(job)
    }

    /// Admin decision on a posting; always acts with admin authority.
    pub(crate) async fn moderate(
        &self,
        admin: &Caller,
        id: &JobId,
        to: JobStatus,
        reason: Option<String>,
    ) -> ApiResult<Job> {
        self.transition(admin, id, to, reason, true).await.map(|(job, _)| job)
    }

    /// Delete a posting that never received applications.
    pub async fn delete(&self, principal: &Principal, id: &JobId) -> ApiResult<()> {
        let caller = principal.caller()?;
        let (job, company) = self.load(id).await?;
        let (_, tier) = manage_job(caller, job.as_ref(), company.as_ref()).inspect_err(|_| denied(caller, id.as_str()))?;

        let applications = self
            .store
            .list_applications(&ApplicationFilter {
                job_ids: Some(vec![id.clone()]),
                ..Default::default()
            })
            .await?;
        if !applications.is_empty() {
            return Err(ApiError::Dependency(Message::JobHasApplications));
        }

        self.store.delete_job(id).await?;
        info!(actor = %caller.id, job_id = %id, "Job deleted");

        if tier == Tier::Admin {
            self.audit
                .record(AuditEntry::new(
                    caller.id.clone(),
                    AuditAction::DeleteJob,
                    TargetType::Job,
                    id.as_str(),
                    Utc::now(),
                ))
                .await;
        }
        Ok(())
    }

    /// Published and closed postings for anyone; the rest for owner or admin.
    pub async fn get(&self, principal: &Principal, id: &JobId) -> ApiResult<JobView> {
        let (job, company) = self.load(id).await?;
        let job = view_job(principal, job.as_ref(), company.as_ref())?;
        Ok(JobView {
            job: job.clone(),
            company_name: company.map(|c| c.name),
        })
    }

    /// Public board: published postings only.
    pub async fn list_public(&self, query: &JobListQuery) -> ApiResult<Page<JobView>> {
        let filter = JobFilter {
            company_id: query.company_id.clone(),
            status: Some(JobStatus::Published),
        };
        let jobs = self.store.list_jobs(&filter).await?;
        self.with_company_names(query.apply(jobs)).await
    }

    /// Every posting of one company, any status.
    pub async fn list_company_jobs(
        &self,
        principal: &Principal,
        company_id: &CompanyId,
        query: &JobListQuery,
    ) -> ApiResult<Page<JobView>> {
        let caller = principal.caller()?;
        let company = self.store.get_company(company_id).await?;
        manage_company(caller, company.as_ref()).inspect_err(|_| denied(caller, company_id.as_str()))?;

        let filter = JobFilter {
            company_id: Some(company_id.clone()),
            status: query.status,
        };
        let jobs = self.store.list_jobs(&filter).await?;
        self.with_company_names(query.apply(jobs)).await
    }

    /// All postings, any company; admin lists.
    pub(crate) async fn list_all(&self, query: &JobListQuery) -> ApiResult<Page<JobView>> {
        let jobs = self.store.list_jobs(&query.filter()).await?;
        self.with_company_names(query.apply(jobs)).await
    }

    async fn transition(
        &self,
        caller: &Caller,
        id: &JobId,
        to: JobStatus,
        reason: Option<String>,
        moderation: bool,
    ) -> ApiResult<(Job, Tier)> {
        let (job, company) = self.load(id).await?;
        let (job, tier) = manage_job(caller, job.as_ref(), company.as_ref()).inspect_err(|_| denied(caller, id.as_str()))?;

        let owns = company.as_ref().is_some_and(|c| c.is_owned_by(&caller.id));
        let actor = if owns && !moderation {
            JobActor::Owner
        } else {
            JobActor::Admin
        };

        let mut job = job.clone();
        let from = job.status;
        job.transition(to, actor, reason, Utc::now()).inspect_err(|e| {
            warn!(actor = %caller.id, job_id = %id, error = %e, "Job transition refused");
            metrics::record_transition_denied(Resource::Job.as_str());
        })?;
        self.store.save_job(&job).await?;

        metrics::record_transition(Resource::Job.as_str(), to.as_str());
        info!(actor = %caller.id, job_id = %id, from = %from, to = %to, "Job status changed");
        Ok((job, tier))
    }

    async fn load(&self, id: &JobId) -> ApiResult<(Option<Job>, Option<Company>)> {
        let Some(job) = self.store.get_job(id).await? else {
            return Ok((None, None));
        };
        let company = self.store.get_company(&job.company_id).await?;
        Ok((Some(job), company))
    }

    async fn with_company_names(&self, page: Page<Job>) -> ApiResult<Page<JobView>> {
        let mut names: HashMap<CompanyId, Option<String>> = HashMap::new();
        for job in &page.items {
            if !names.contains_key(&job.company_id) {
                let company = self.store.get_company(&job.company_id).await?;
                names.insert(job.company_id.clone(), company.map(|c| c.name));
            }
        }
        Ok(page.map(|job| JobView {
            company_name: names.get(&job.company_id).cloned().flatten(),
            job,
        }))
    }
}

fn denied(caller: &Caller, target: &str) {
    warn!(caller = %caller.id, target_id = %target, "Job access denied");
    metrics::record_access_denied(Resource::Job.as_str());
}
