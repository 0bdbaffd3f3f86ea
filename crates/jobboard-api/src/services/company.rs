//! Companies and their logos.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use jobboard_models::authz::{manage_company, AccessDenied};
use jobboard_models::query::{ApplicationFilter, CompanyFilter, CompanyListQuery, JobFilter};
use jobboard_models::{
    AuditAction, AuditEntry, Caller, Company, CompanyId, CompanyInput, JobStatus, Page, Principal, Resource, TargetType,
    Tier, UserRole,
};
use jobboard_storage::{object_key, validate_upload, UploadKind};

use crate::blob::BlobStore;
use crate::error::{ApiError, ApiResult};
use crate::extract::Upload;
use crate::i18n::Message;
use crate::metrics;
use crate::services::audit::AuditLog;
use crate::services::profile::SignedUrl;
use crate::store::Store;

#[derive(Clone)]
pub struct CompanyService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    audit: AuditLog,
    presign_ttl: Duration,
}

impl CompanyService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>, audit: AuditLog, presign_ttl: Duration) -> Self {
        Self {
            store,
            blobs,
            audit,
            presign_ttl,
        }
    }

    /// Create a company owned by the caller. Employers own at most one.
    pub async fn create(&self, principal: &Principal, input: CompanyInput) -> ApiResult<Company> {
        let caller = principal.require_role(&[UserRole::Employer])?;

        if !caller.is_admin() {
            let owned = self
                .store
                .list_companies(&CompanyFilter {
                    owner_id: Some(caller.id.clone()),
                    ..Default::default()
                })
                .await?;
            if !owned.is_empty() {
                return Err(ApiError::Conflict(Message::AlreadyExists));
            }
        }

        let company = Company::from_input(caller.id.clone(), input, Utc::now());
        self.store.create_company(&company).await?;

        info!(owner = %caller.id, company_id = %company.id, "Company created");
        Ok(company)
    }

    pub async fn update(&self, principal: &Principal, id: &CompanyId, input: CompanyInput) -> ApiResult<Company> {
        let caller = principal.caller()?;
        let stored = self.store.get_company(id).await?;
        let (company, _) = manage_company(caller, stored.as_ref()).inspect_err(|_| denied(caller, id))?;

        let mut company = company.clone();
        company.apply_input(input, Utc::now());
        self.store.save_company(&company).await?;

        info!(actor = %caller.id, company_id = %id, "Company updated");
        Ok(company)
    }

    /// Delete a company with its remaining jobs and finished applications.
    ///
    /// Refused while any job is published or any application is still in
    /// progress.
    pub async fn delete(&self, principal: &Principal, id: &CompanyId) -> ApiResult<()> {
        let caller = principal.caller()?;
        let stored = self.store.get_company(id).await?;
        let (company, tier) = manage_company(caller, stored.as_ref()).inspect_err(|_| denied(caller, id))?;

        let jobs = self
            .store
            .list_jobs(&JobFilter {
                company_id: Some(id.clone()),
                ..Default::default()
            })
            .await?;
        if jobs.iter().any(|job| job.status == JobStatus::Published) {
            return Err(ApiError::Dependency(Message::CompanyHasPublishedJobs));
        }

        let applications = if jobs.is_empty() {
            Vec::new()
        } else {
            self.store
                .list_applications(&ApplicationFilter {
                    job_ids: Some(jobs.iter().map(|job| job.id.clone()).collect()),
                    ..Default::default()
                })
                .await?
        };
        if applications.iter().any(|app| app.status.is_active()) {
            return Err(ApiError::Dependency(Message::CompanyHasActiveApplications));
        }

        for application in &applications {
            self.store.delete_application(&application.id).await?;
        }
        for job in &jobs {
            self.store.delete_job(&job.id).await?;
        }
        if let Some(logo) = &company.logo_path {
            if let Err(e) = self.blobs.delete(logo).await {
                warn!(company_id = %id, key = %logo, error = %e, "Failed to delete company logo");
            }
        }
        self.store.delete_company(id).await?;

        info!(
            actor = %caller.id,
            company_id = %id,
            jobs = jobs.len(),
            applications = applications.len(),
            "Company deleted"
        );
        if tier == Tier::Admin {
            self.audit
                .record(AuditEntry::new(
                    caller.id.clone(),
                    AuditAction::DeleteCompany,
                    TargetType::Company,
                    id.as_str(),
                    Utc::now(),
                ))
                .await;
        }
        Ok(())
    }

    /// Public read.
    pub async fn get(&self, id: &CompanyId) -> ApiResult<Company> {
        self.store
            .get_company(id)
            .await?
            .ok_or_else(|| AccessDenied::Row(Resource::Company).into())
    }

    /// Verified companies for everyone; admins see all and may filter.
    pub async fn list(&self, principal: &Principal, query: &CompanyListQuery) -> ApiResult<Page<Company>> {
        let verified = if principal.is_admin() {
            query.verified
        } else {
            Some(true)
        };
        let companies = self
            .store
            .list_companies(&CompanyFilter {
                verified,
                ..Default::default()
            })
            .await?;
        let rows = companies.into_iter().filter(|c| query.matches(c)).collect();
        Ok(Page::from_rows(rows, query.pagination()))
    }

    /// The company owned by the caller.
    pub async fn mine(&self, principal: &Principal) -> ApiResult<Company> {
        let caller = principal.require_role(&[UserRole::Employer])?;
        let owned = self
            .store
            .list_companies(&CompanyFilter {
                owner_id: Some(caller.id.clone()),
                ..Default::default()
            })
            .await?;
        owned.into_iter().next().ok_or(ApiError::NotFound(Message::NoCompany))
    }

    /// Store a new logo and point the company at it.
    pub async fn upload_logo(&self, principal: &Principal, id: &CompanyId, upload: Upload) -> ApiResult<Company> {
        let caller = principal.caller()?;
        let stored = self.store.get_company(id).await?;
        let (company, _) = manage_company(caller, stored.as_ref()).inspect_err(|_| denied(caller, id))?;

        let ext = validate_upload(UploadKind::Logo, &upload.content_type, upload.bytes.len())?;
        let now = Utc::now();
        let key = object_key(UploadKind::Logo, id.as_str(), ext, now);
        self.blobs.put(&key, upload.bytes, &upload.content_type).await?;

        let mut company = company.clone();
        let previous = company.logo_path.replace(key.clone());
        company.updated_at = now;
        self.store.save_company(&company).await?;
        metrics::record_upload(UploadKind::Logo.as_str());
        info!(actor = %caller.id, company_id = %id, key = %key, "Company logo uploaded");

        if let Some(old) = previous.filter(|old| old != &key) {
            if let Err(e) = self.blobs.delete(&old).await {
                warn!(company_id = %id, key = %old, error = %e, "Failed to delete previous logo");
            }
        }
        Ok(company)
    }

    /// Presigned URL for a company's logo. Public.
    pub async fn logo_url(&self, id: &CompanyId) -> ApiResult<SignedUrl> {
        let company = self.get(id).await?;
        let key = company.logo_path.ok_or(ApiError::NotFound(Message::NoLogo))?;
        let url = self.blobs.presign_get(&key, self.presign_ttl).await?;
        Ok(SignedUrl {
            url,
            expires_in: self.presign_ttl.as_secs(),
        })
    }
}

fn denied(caller: &Caller, id: &CompanyId) {
    warn!(caller = %caller.id, company_id = %id, "Company access denied");
    metrics::record_access_denied(Resource::Company.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::services::fixtures::{admin, application, employer, job, seeker, Fixture};
    use jobboard_models::ApplicationStatus;

    fn service(fx: &Fixture) -> CompanyService {
        CompanyService::new(
            fx.store.clone(),
            Arc::new(MemoryBlobStore::new()),
            AuditLog::new(fx.store.clone()),
            Duration::from_secs(60),
        )
    }

    fn input(name: &str) -> CompanyInput {
        CompanyInput {
            name: name.into(),
            description: None,
            website: None,
            size_id: None,
            industry_id: Some("tech".into()),
            location_id: None,
        }
    }

    #[tokio::test]
    async fn test_employer_owns_one_company() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let owner = employer("e1");
        svc.create(&owner, input("Acme")).await.unwrap();
        let err = svc.create(&owner, input("Acme Two")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(Message::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_job_seeker_cannot_create() {
        let fx = Fixture::new();
        let err = service(&fx).create(&seeker("s1"), input("Acme")).await.unwrap_err();
        assert_eq!(err.code(), "forbidden");
    }

    #[tokio::test]
    async fn test_foreign_and_missing_company_fail_alike() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let company = svc.create(&employer("e1"), input("Acme")).await.unwrap();

        let foreign = svc.update(&employer("e2"), &company.id, input("Mine")).await.unwrap_err();
        let missing = svc
            .update(&employer("e2"), &CompanyId::from("nope"), input("Mine"))
            .await
            .unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_published_job() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let company = svc.create(&employer("e1"), input("Acme")).await.unwrap();
        fx.insert_job(job(&company.id, JobStatus::Published)).await;

        let err = svc.delete(&employer("e1"), &company.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Dependency(Message::CompanyHasPublishedJobs)));
    }

    #[tokio::test]
    async fn test_delete_cascades_finished_rows() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let company = svc.create(&employer("e1"), input("Acme")).await.unwrap();
        let closed = fx.insert_job(job(&company.id, JobStatus::Closed)).await;
        let app = fx
            .insert_application(application(&closed.id, "s1", ApplicationStatus::Rejected))
            .await;

        svc.delete(&admin("root"), &company.id).await.unwrap();

        assert!(fx.store.get_company(&company.id).await.unwrap().is_none());
        assert!(fx.store.get_job(&closed.id).await.unwrap().is_none());
        assert!(fx.store.get_application(&app.id).await.unwrap().is_none());
        let audit = fx.store.list_audit(10).await.unwrap();
        assert_eq!(audit[0].action, AuditAction::DeleteCompany);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_active_application() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let company = svc.create(&employer("e1"), input("Acme")).await.unwrap();
        let closed = fx.insert_job(job(&company.id, JobStatus::Closed)).await;
        fx.insert_application(application(&closed.id, "s1", ApplicationStatus::Interviewing))
            .await;

        let err = svc.delete(&employer("e1"), &company.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Dependency(Message::CompanyHasActiveApplications)));
    }

    #[tokio::test]
    async fn test_public_list_hides_unverified() {
        let fx = Fixture::new();
        let svc = service(&fx);
        svc.create(&employer("e1"), input("Acme")).await.unwrap();

        let public = svc.list(&Principal::Anonymous, &CompanyListQuery::default()).await.unwrap();
        assert_eq!(public.total, 0);
        let all = svc.list(&admin("root"), &CompanyListQuery::default()).await.unwrap();
        assert_eq!(all.total, 1);
    }
}
