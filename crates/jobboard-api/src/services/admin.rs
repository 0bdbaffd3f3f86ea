//! Admin moderation and user management.
//!
//! Every mutation here appends an [`AuditEntry`] once it has been written.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use jobboard_models::authz::guard_self_protection;
use jobboard_models::company::ModerationReason;
use jobboard_models::profile::{SetActiveRequest, SetRoleRequest};
use jobboard_models::query::{ApplicationListQuery, AuditListQuery, CompanyListQuery, JobListQuery, UserListQuery};
use jobboard_models::{
    Application, AuditAction, AuditEntry, Company, CompanyId, Job, JobId, JobStatus, Page, Principal, Profile,
    TargetType, UserId,
};

use crate::error::{ApiError, ApiResult};
use crate::i18n::Message;
use crate::security::sanitize_text;
use crate::services::application::ApplicationService;
use crate::services::audit::AuditLog;
use crate::services::company::CompanyService;
use crate::services::job::{JobService, JobView};
use crate::store::Store;

/// Audit entries fetched for the paginated log.
const AUDIT_FETCH_LIMIT: usize = 1000;

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn Store>,
    jobs: JobService,
    companies: CompanyService,
    applications: ApplicationService,
    audit: AuditLog,
}

impl AdminService {
    pub fn new(
        store: Arc<dyn Store>,
        jobs: JobService,
        companies: CompanyService,
        applications: ApplicationService,
        audit: AuditLog,
    ) -> Self {
        Self {
            store,
            jobs,
            companies,
            applications,
            audit,
        }
    }

    pub async fn approve_job(&self, principal: &Principal, id: &JobId) -> ApiResult<Job> {
        let admin = principal.require_admin()?;
        let job = self.jobs.moderate(admin, id, JobStatus::Published, None).await?;
        self.audit
            .record(AuditEntry::new(admin.id.clone(), AuditAction::ApproveJob, TargetType::Job, id.as_str(), Utc::now()))
            .await;
        Ok(job)
    }

    /// Send a pending posting back to draft with a reason.
    pub async fn reject_job(&self, principal: &Principal, id: &JobId, req: ModerationReason) -> ApiResult<Job> {
        let admin = principal.require_admin()?;
        let reason = sanitize_text(&req.reason);
        let job = self
            .jobs
            .moderate(admin, id, JobStatus::Draft, Some(reason.clone()))
            .await?;
        self.audit
            .record(
                AuditEntry::new(admin.id.clone(), AuditAction::RejectJob, TargetType::Job, id.as_str(), Utc::now())
                    .with_reason(reason),
            )
            .await;
        Ok(job)
    }

    pub async fn archive_job(&self, principal: &Principal, id: &JobId) -> ApiResult<Job> {
        let admin = principal.require_admin()?;
        let job = self.jobs.moderate(admin, id, JobStatus::Archived, None).await?;
        self.audit
            .record(AuditEntry::new(admin.id.clone(), AuditAction::ArchiveJob, TargetType::Job, id.as_str(), Utc::now()))
            .await;
        Ok(job)
    }

    pub async fn verify_company(&self, principal: &Principal, id: &CompanyId) -> ApiResult<Company> {
        let admin = principal.require_admin()?;
        let mut company = self.load_company(id).await?;
        if company.verified {
            return Err(ApiError::Conflict(Message::AlreadyVerified));
        }

        let now = Utc::now();
        company.verified = true;
        company.verified_at = Some(now);
        company.rejection_reason = None;
        company.updated_at = now;
        self.store.save_company(&company).await?;

        info!(admin = %admin.id, company_id = %id, "Company verified");
        self.audit
            .record(AuditEntry::new(admin.id.clone(), AuditAction::VerifyCompany, TargetType::Company, id.as_str(), now))
            .await;
        Ok(company)
    }

    /// Clear verification and record why.
    pub async fn reject_company(&self, principal: &Principal, id: &CompanyId, req: ModerationReason) -> ApiResult<Company> {
        let admin = principal.require_admin()?;
        let mut company = self.load_company(id).await?;

        let now = Utc::now();
        let reason = sanitize_text(&req.reason);
        company.verified = false;
        company.verified_at = None;
        company.rejection_reason = Some(reason.clone());
        company.updated_at = now;
        self.store.save_company(&company).await?;

        info!(admin = %admin.id, company_id = %id, "Company rejected");
        self.audit
            .record(
                AuditEntry::new(admin.id.clone(), AuditAction::RejectCompany, TargetType::Company, id.as_str(), now)
                    .with_reason(reason),
            )
            .await;
        Ok(company)
    }

    pub async fn list_users(&self, principal: &Principal, query: &UserListQuery) -> ApiResult<Page<Profile>> {
        principal.require_admin()?;
        let profiles = self.store.list_profiles(&query.filter()).await?;
        let rows = profiles.into_iter().filter(|p| query.matches(p)).collect();
        Ok(Page::from_rows(rows, query.pagination()))
    }

    pub async fn get_user(&self, principal: &Principal, uid: &UserId) -> ApiResult<Profile> {
        principal.require_admin()?;
        self.load_user(uid).await
    }

    /// Change another user's role. Admins cannot change their own.
    pub async fn set_user_role(&self, principal: &Principal, uid: &UserId, req: SetRoleRequest) -> ApiResult<Profile> {
        let admin = principal.require_admin()?;
        guard_self_protection(admin, uid)?;

        let mut profile = self.load_user(uid).await?;
        let now = Utc::now();
        profile.role = req.role;
        profile.registered = true;
        profile.updated_at = now;
        self.store.save_profile(&profile).await?;

        info!(admin = %admin.id, uid = %uid, role = %req.role, "User role changed");
        self.audit
            .record(
                AuditEntry::new(admin.id.clone(), AuditAction::SetUserRole, TargetType::User, uid.as_str(), now)
                    .with_reason(format!("role={}", req.role)),
            )
            .await;
        Ok(profile)
    }

    /// Activate or deactivate another user. Admins cannot change their own flag.
    pub async fn set_user_active(
        &self,
        principal: &Principal,
        uid: &UserId,
        req: SetActiveRequest,
    ) -> ApiResult<Profile> {
        let admin = principal.require_admin()?;
        guard_self_protection(admin, uid)?;

        let mut profile = self.load_user(uid).await?;
        let now = Utc::now();
        profile.active = req.active;
        profile.updated_at = now;
        self.store.save_profile(&profile).await?;

        info!(admin = %admin.id, uid = %uid, active = req.active, "User activation changed");
        self.audit
            .record(
                AuditEntry::new(admin.id.clone(), AuditAction::SetUserActive, TargetType::User, uid.as_str(), now)
                    .with_reason(format!("active={}", req.active)),
            )
            .await;
        Ok(profile)
    }

    pub async fn list_audit(&self, principal: &Principal, query: &AuditListQuery) -> ApiResult<Page<AuditEntry>> {
        principal.require_admin()?;
        let entries = self.store.list_audit(AUDIT_FETCH_LIMIT).await?;
        Ok(Page::from_rows(entries, query.pagination()))
    }

    pub async fn list_jobs(&self, principal: &Principal, query: &JobListQuery) -> ApiResult<Page<JobView>> {
        principal.require_admin()?;
        self.jobs.list_all(query).await
    }

    pub async fn list_companies(&self, principal: &Principal, query: &CompanyListQuery) -> ApiResult<Page<Company>> {
        principal.require_admin()?;
        self.companies.list(principal, query).await
    }

    pub async fn list_applications(
        &self,
        principal: &Principal,
        query: &ApplicationListQuery,
    ) -> ApiResult<Page<Application>> {
        principal.require_admin()?;
        self.applications.list_all(query).await
    }

    async fn load_company(&self, id: &CompanyId) -> ApiResult<Company> {
        self.store
            .get_company(id)
            .await?
            .ok_or(ApiError::NotFound(Message::CompanyNotFound))
    }

    async fn load_user(&self, uid: &UserId) -> ApiResult<Profile> {
        self.store
            .get_profile(uid)
            .await?
            .ok_or(ApiError::NotFound(Message::UserNotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::services::fixtures::{admin, company, employer, job, Fixture};
    use jobboard_models::UserRole;
    use std::time::Duration;

    fn service(fx: &Fixture) -> AdminService {
        let audit = AuditLog::new(fx.store.clone());
        AdminService::new(
            fx.store.clone(),
            JobService::new(fx.store.clone(), audit.clone()),
            CompanyService::new(
                fx.store.clone(),
                Arc::new(MemoryBlobStore::new()),
                audit.clone(),
                Duration::from_secs(60),
            ),
            ApplicationService::new(fx.store.clone()),
            audit,
        )
    }

    fn reason(text: &str) -> ModerationReason {
        ModerationReason { reason: text.into() }
    }

    #[tokio::test]
    async fn test_approve_publishes_and_audits() {
        let fx = Fixture::new();
        let acme = fx.insert_company(company("e1", "Acme")).await;
        let pending = fx.insert_job(job(&acme.id, JobStatus::PendingApproval)).await;

        let published = service(&fx).approve_job(&admin("root"), &pending.id).await.unwrap();
        assert!(published.published_at.is_some());

        let log = fx.store.list_audit(10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, AuditAction::ApproveJob);
        assert_eq!(log[0].target_id, pending.id.as_str());
    }

    #[tokio::test]
    async fn test_reject_job_keeps_reason() {
        let fx = Fixture::new();
        let acme = fx.insert_company(company("e1", "Acme")).await;
        let pending = fx.insert_job(job(&acme.id, JobStatus::PendingApproval)).await;

        let rejected = service(&fx)
            .reject_job(&admin("root"), &pending.id, reason("Salary missing"))
            .await
            .unwrap();
        assert_eq!(rejected.status, JobStatus::Draft);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Salary missing"));
        assert_eq!(rejected.published_at, None);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_moderate() {
        let fx = Fixture::new();
        let acme = fx.insert_company(company("e1", "Acme")).await;
        let pending = fx.insert_job(job(&acme.id, JobStatus::PendingApproval)).await;

        let err = service(&fx).approve_job(&employer("e1"), &pending.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(Message::AdminOnly)));
    }

    #[tokio::test]
    async fn test_verify_twice_conflicts() {
        let fx = Fixture::new();
        let acme = fx.insert_company(company("e1", "Acme")).await;
        let svc = service(&fx);

        let verified = svc.verify_company(&admin("root"), &acme.id).await.unwrap();
        assert!(verified.verified_at.is_some());
        let err = svc.verify_company(&admin("root"), &acme.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(Message::AlreadyVerified)));

        let rejected = svc
            .reject_company(&admin("root"), &acme.id, reason("Unverifiable address"))
            .await
            .unwrap();
        assert!(!rejected.verified);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Unverifiable address"));
    }

    #[tokio::test]
    async fn test_moderating_unknown_company_is_not_found() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let ghost = CompanyId::from("ghost");

        let err = svc.verify_company(&admin("root"), &ghost).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(Message::CompanyNotFound)));
        let err = svc
            .reject_company(&admin("root"), &ghost, reason("Unverifiable address"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(Message::CompanyNotFound)));
    }

    #[tokio::test]
    async fn test_admin_cannot_change_self() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let root = admin("root");

        let err = svc
            .set_user_active(&root, &UserId::from("root"), SetActiveRequest { active: false })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(Message::SelfProtection)));

        let err = svc
            .set_user_role(&root, &UserId::from("root"), SetRoleRequest { role: UserRole::Admin })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(Message::SelfProtection)));
    }

    #[tokio::test]
    async fn test_set_role_on_unknown_user() {
        let fx = Fixture::new();
        let err = service(&fx)
            .set_user_role(&admin("root"), &UserId::from("ghost"), SetRoleRequest { role: UserRole::Employer })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(Message::UserNotFound)));
    }
}
