//! Job applications.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use jobboard_models::application::{ApplicationNotesRequest, ApplicationStatusRequest, ApplyRequest};
use jobboard_models::authz::{manage_job, own_application, review_application, view_application, view_job};
use jobboard_models::query::{ApplicationFilter, ApplicationListQuery};
use jobboard_models::{
    Application, ApplicationActor, ApplicationId, ApplicationStatus, Caller, Company, JobId, Page, Principal,
    Resource, Tier, UserRole,
};

use crate::error::{ApiError, ApiResult};
use crate::i18n::Message;
use crate::metrics;
use crate::security::sanitize_optional;
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn Store>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Apply to a published job. One application per job and applicant.
    pub async fn apply(&self, principal: &Principal, job_id: &JobId, req: ApplyRequest) -> ApiResult<Application> {
        let caller = principal.require_role(&[UserRole::JobSeeker])?;
        let job = self.store.get_job(job_id).await?;
        let company = match &job {
            Some(job) => self.store.get_company(&job.company_id).await?,
            None => None,
        };
        let job = view_job(principal, job.as_ref(), company.as_ref())?;

        let now = Utc::now();
        if !job.accepts_applications(now) {
            return Err(ApiError::Conflict(Message::JobNotAcceptingApplications));
        }

        let resume_path = self
            .store
            .get_profile(&caller.id)
            .await?
            .and_then(|profile| profile.resume_path);
        let application = Application::new(
            job.id.clone(),
            caller.id.clone(),
            sanitize_optional(req.cover_letter),
            resume_path,
            now,
        );

        match self.store.create_application(&application).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => return Err(ApiError::Conflict(Message::AlreadyApplied)),
            Err(e) => return Err(e.into()),
        }

        metrics::record_application_submitted();
        info!(applicant = %caller.id, job_id = %job_id, application_id = %application.id, "Application submitted");
        Ok(application.for_applicant())
    }

    /// The caller's own applications, newest first.
    pub async fn list_mine(&self, principal: &Principal, query: &ApplicationListQuery) -> ApiResult<Page<Application>> {
        let caller = principal.caller()?;
        let filter = ApplicationFilter {
            applicant_id: Some(caller.id.clone()),
            status: query.status,
            ..Default::default()
        };
        let rows = self.store.list_applications(&filter).await?;
        Ok(Page::from_rows(rows, query.pagination()).map(Application::for_applicant))
    }

    /// Applicant, job owner or admin. Applicants never see reviewer notes.
    pub async fn get(&self, principal: &Principal, id: &ApplicationId) -> ApiResult<Application> {
        let caller = principal.caller()?;
        let (application, company) = self.load(id).await?;
        let (application, tier) =
            view_application(caller, application.as_ref(), company.as_ref()).inspect_err(|_| denied(caller, id))?;

        let application = application.clone();
        Ok(match tier {
            Tier::SelfService => application.for_applicant(),
            Tier::Owner | Tier::Admin => application,
        })
    }

    /// Applications to one job; job owner or admin.
    pub async fn list_for_job(
        &self,
        principal: &Principal,
        job_id: &JobId,
        query: &ApplicationListQuery,
    ) -> ApiResult<Page<Application>> {
        let caller = principal.caller()?;
        let job = self.store.get_job(job_id).await?;
        let company = match &job {
            Some(job) => self.store.get_company(&job.company_id).await?,
            None => None,
        };
        manage_job(caller, job.as_ref(), company.as_ref()).inspect_err(|_| {
            warn!(caller = %caller.id, job_id = %job_id, "Job applications access denied");
            metrics::record_access_denied(Resource::Job.as_str());
        })?;

        let filter = ApplicationFilter {
            job_ids: Some(vec![job_id.clone()]),
            status: query.status,
            ..Default::default()
        };
        let rows = self.store.list_applications(&filter).await?;
        Ok(Page::from_rows(rows, query.pagination()))
    }

    /// All applications; admin lists.
    pub(crate) async fn list_all(&self, query: &ApplicationListQuery) -> ApiResult<Page<Application>> {
        let filter = ApplicationFilter {
            status: query.status,
            ..Default::default()
        };
        let rows = self.store.list_applications(&filter).await?;
        Ok(Page::from_rows(rows, query.pagination()))
    }

    /// Reviewer decision.
    pub async fn update_status(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        req: ApplicationStatusRequest,
    ) -> ApiResult<Application> {
        let caller = principal.caller()?;
        let (application, company) = self.load(id).await?;
        let (application, _) =
            review_application(caller, application.as_ref(), company.as_ref()).inspect_err(|_| denied(caller, id))?;

        let mut application = application.clone();
        self.move_to(caller, &mut application, req.status, ApplicationActor::Reviewer).await?;
        Ok(application)
    }

    pub async fn update_notes(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        req: ApplicationNotesRequest,
    ) -> ApiResult<Application> {
        let caller = principal.caller()?;
        let (application, company) = self.load(id).await?;
        let (application, _) =
            review_application(caller, application.as_ref(), company.as_ref()).inspect_err(|_| denied(caller, id))?;

        let mut application = application.clone();
        application.notes = sanitize_optional(Some(req.notes));
        application.updated_at = Utc::now();
        self.store.save_application(&application).await?;

        info!(actor = %caller.id, application_id = %id, "Application notes updated");
        Ok(application)
    }

    /// Applicant pulls out.
    pub async fn withdraw(&self, principal: &Principal, id: &ApplicationId) -> ApiResult<Application> {
        let caller = principal.caller()?;
        let application = self.store.get_application(id).await?;
        let application = own_application(caller, application.as_ref()).inspect_err(|_| denied(caller, id))?;

        let mut application = application.clone();
        self.move_to(caller, &mut application, ApplicationStatus::Withdrawn, ApplicationActor::Applicant)
            .await?;
        Ok(application.for_applicant())
    }

    async fn move_to(
        &self,
        caller: &Caller,
        application: &mut Application,
        to: ApplicationStatus,
        actor: ApplicationActor,
    ) -> ApiResult<()> {
        let from = application.status;
        application.transition(to, actor, Utc::now()).inspect_err(|e| {
            warn!(actor = %caller.id, application_id = %application.id, error = %e, "Application transition refused");
            metrics::record_transition_denied(Resource::Application.as_str());
        })?;
        self.store.save_application(application).await?;

        metrics::record_transition(Resource::Application.as_str(), to.as_str());
        info!(
            actor = %caller.id,
            application_id = %application.id,
            from = %from,
            to = %to,
            "Application status changed"
        );
        Ok(())
    }

    /// The application and the company owning its job.
    async fn load(&self, id: &ApplicationId) -> ApiResult<(Option<Application>, Option<Company>)> {
        let Some(application) = self.store.get_application(id).await? else {
            return Ok((None, None));
        };
        let company = match self.store.get_job(&application.job_id).await? {
            Some(job) => self.store.get_company(&job.company_id).await?,
            None => None,
        };
        Ok((Some(application), company))
    }
}

fn denied(caller: &Caller, id: &ApplicationId) {
    warn!(caller = %caller.id, application_id = %id, "Application access denied");
    metrics::record_access_denied(Resource::Application.as_str());
}
