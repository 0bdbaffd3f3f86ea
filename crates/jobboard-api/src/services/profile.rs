//! Profiles and resumes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use jobboard_models::authz::AccessDenied;
use jobboard_models::profile::{ProfileUpdateRequest, RegisterProfileRequest};
use jobboard_models::query::{ApplicationFilter, CompanyFilter, JobFilter};
use jobboard_models::{Caller, Principal, Profile, Resource, UserId, UserRole};
use jobboard_storage::{object_key, validate_upload, UploadKind};

use crate::auth::AuthUser;
use crate::blob::BlobStore;
use crate::error::{ApiError, ApiResult};
use crate::extract::Upload;
use crate::i18n::Message;
use crate::metrics;
use crate::security::{sanitize_optional, sanitize_text};
use crate::store::{Store, StoreError};

/// Presigned link to a stored object.
#[derive(Debug, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    presign_ttl: Duration,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>, presign_ttl: Duration) -> Self {
        Self {
            store,
            blobs,
            presign_ttl,
        }
    }

    /// Load the profile of a verified user, creating it on first sight.
    pub async fn ensure(&self, user: &AuthUser) -> ApiResult<Profile> {
        if let Some(mut profile) = self.store.get_profile(&user.uid).await? {
            // Keep the stored email in step with the identity provider
            if user.email.is_some() && profile.email != user.email {
                profile.email = user.email.clone();
                profile.updated_at = Utc::now();
                if let Err(e) = self.store.save_profile(&profile).await {
                    warn!(uid = %user.uid, error = %e, "Failed to refresh profile email");
                }
            }
            return Ok(profile);
        }

        let profile = Profile::first_seen(user.uid.clone(), user.email.clone(), Utc::now());
        match self.store.create_profile(&profile).await {
            Ok(()) => {
                info!(uid = %user.uid, "Created profile on first sign-in");
                Ok(profile)
            }
            // Two first requests raced; the other one created it
            Err(StoreError::AlreadyExists(_)) => self
                .store
                .get_profile(&user.uid)
                .await?
                .ok_or_else(|| ApiError::internal("profile vanished after concurrent create")),
            Err(e) => Err(e.into()),
        }
    }

    /// The caller's own profile. Deactivated users may still read it.
    pub async fn get_mine(&self, principal: &Principal) -> ApiResult<Profile> {
        let caller = principal.caller_allow_inactive()?;
        self.load(&caller.id).await
    }

    /// One-time choice of the initial role.
    pub async fn register(&self, principal: &Principal, req: RegisterProfileRequest) -> ApiResult<Profile> {
        let caller = principal.caller()?;
        if !matches!(req.role, UserRole::JobSeeker | UserRole::Employer) {
            return Err(ApiError::invalid_field("role"));
        }

        let mut profile = self.load(&caller.id).await?;
        if profile.registered || profile.role == UserRole::Admin {
            return Err(ApiError::Conflict(Message::AlreadyRegistered));
        }

        profile.role = req.role;
        profile.full_name = Some(sanitize_text(&req.full_name));
        profile.registered = true;
        profile.updated_at = Utc::now();
        self.store.save_profile(&profile).await?;

        info!(uid = %caller.id, role = %profile.role, "Profile registered");
        Ok(profile)
    }

    pub async fn update(&self, principal: &Principal, req: ProfileUpdateRequest) -> ApiResult<Profile> {
        let caller = principal.caller()?;
        let mut profile = self.load(&caller.id).await?;

        if let Some(name) = req.full_name {
            profile.full_name = sanitize_optional(Some(name));
        }
        if let Some(headline) = req.headline {
            profile.headline = sanitize_optional(Some(headline));
        }
        if let Some(phone) = req.phone {
            profile.phone = sanitize_optional(Some(phone));
        }
        profile.updated_at = Utc::now();
        self.store.save_profile(&profile).await?;

        info!(uid = %caller.id, "Profile updated");
        Ok(profile)
    }

    /// Store a new resume and point the profile at it.
    ///
    /// Each upload gets a fresh key. The previous object is removed once the
    /// profile references the new one, unless an application still points at it.
    pub async fn upload_resume(&self, principal: &Principal, upload: Upload) -> ApiResult<Profile> {
        let caller = principal.require_role(&[UserRole::JobSeeker])?;
        let ext = validate_upload(UploadKind::Resume, &upload.content_type, upload.bytes.len())?;
        let now = Utc::now();
        let key = object_key(UploadKind::Resume, caller.id.as_str(), ext, now);

        let mut profile = self.load(&caller.id).await?;
        self.blobs.put(&key, upload.bytes, &upload.content_type).await?;

        let previous = profile.resume_path.replace(key.clone());
        profile.updated_at = now;
        self.store.save_profile(&profile).await?;
        metrics::record_upload(UploadKind::Resume.as_str());
        info!(uid = %caller.id, key = %key, "Resume uploaded");

        if let Some(old) = previous.filter(|old| old != &key) {
            if self.resume_in_use(&caller.id, &old).await? {
                debug!(uid = %caller.id, key = %old, "Previous resume kept for submitted applications");
            } else if let Err(e) = self.blobs.delete(&old).await {
                warn!(uid = %caller.id, key = %old, error = %e, "Failed to delete previous resume");
            }
        }
        Ok(profile)
    }

    async fn resume_in_use(&self, uid: &UserId, key: &str) -> ApiResult<bool> {
        let applications = self
            .store
            .list_applications(&ApplicationFilter {
                applicant_id: Some(uid.clone()),
                ..Default::default()
            })
            .await?;
        Ok(applications
            .iter()
            .any(|a| a.resume_path.as_deref() == Some(key)))
    }

    /// Presigned URL for a user's resume.
    ///
    /// Allowed for the user, an admin, or an employer owning a company with a
    /// job the user applied to.
    pub async fn resume_url(&self, principal: &Principal, user_id: &UserId) -> ApiResult<SignedUrl> {
        let caller = principal.caller()?;
        if !self.can_read_resume(caller, user_id).await? {
            warn!(caller = %caller.id, target = %user_id, "Resume access denied");
            metrics::record_access_denied("resume");
            return Err(AccessDenied::Row(Resource::Profile).into());
        }

        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or(AccessDenied::Row(Resource::Profile))?;
        let key = profile.resume_path.ok_or(ApiError::NotFound(Message::NoResume))?;
        let url = self.blobs.presign_get(&key, self.presign_ttl).await?;

        Ok(SignedUrl {
            url,
            expires_in: self.presign_ttl.as_secs(),
        })
    }

    async fn can_read_resume(&self, caller: &Caller, user_id: &UserId) -> ApiResult<bool> {
        if &caller.id == user_id || caller.is_admin() {
            return Ok(true);
        }
        if caller.role != UserRole::Employer {
            return Ok(false);
        }

        let companies = self
            .store
            .list_companies(&CompanyFilter {
                owner_id: Some(caller.id.clone()),
                ..Default::default()
            })
            .await?;
        let mut job_ids = Vec::new();
        for company in &companies {
            let jobs = self
                .store
                .list_jobs(&JobFilter {
                    company_id: Some(company.id.clone()),
                    ..Default::default()
                })
                .await?;
            job_ids.extend(jobs.into_iter().map(|job| job.id));
        }
        if job_ids.is_empty() {
            return Ok(false);
        }

        let applications = self
            .store
            .list_applications(&ApplicationFilter {
                job_ids: Some(job_ids),
                applicant_id: Some(user_id.clone()),
                ..Default::default()
            })
            .await?;
        debug!(caller = %caller.id, matches = applications.len(), "Checked resume access through applications");
        Ok(!applications.is_empty())
    }

    async fn load(&self, id: &UserId) -> ApiResult<Profile> {
        self.store
            .get_profile(id)
            .await?
            .ok_or_else(|| AccessDenied::Row(Resource::Profile).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::store::MemoryStore;
    use jobboard_models::{Application, Caller, JobId};

    fn service() -> (ProfileService, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = ProfileService::new(Arc::new(MemoryStore::new()), blobs.clone(), Duration::from_secs(60));
        (service, blobs)
    }

    fn user(uid: &str) -> AuthUser {
        AuthUser {
            uid: UserId::from(uid),
            email: Some(format!("{uid}@example.com")),
        }
    }

    fn principal(profile: &Profile) -> Principal {
        Principal::User(Caller::from_profile(profile))
    }

    #[tokio::test]
    async fn test_ensure_creates_job_seeker_once() {
        let (service, _) = service();
        let first = service.ensure(&user("u1")).await.unwrap();
        assert_eq!(first.role, UserRole::JobSeeker);
        assert!(!first.registered);

        let second = service.ensure(&user("u1")).await.unwrap();
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_register_only_once() {
        let (service, _) = service();
        let profile = service.ensure(&user("u1")).await.unwrap();
        let req = || RegisterProfileRequest {
            role: UserRole::Employer,
            full_name: "Ana Ruiz".into(),
        };

        let registered = service.register(&principal(&profile), req()).await.unwrap();
        assert_eq!(registered.role, UserRole::Employer);

        let err = service.register(&principal(&registered), req()).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(Message::AlreadyRegistered)));
    }

    #[tokio::test]
    async fn test_register_rejects_admin_role() {
        let (service, _) = service();
        let profile = service.ensure(&user("u1")).await.unwrap();
        let err = service
            .register(
                &principal(&profile),
                RegisterProfileRequest {
                    role: UserRole::Admin,
                    full_name: "Eve".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[tokio::test]
    async fn test_resume_upload_replaces_previous_object() {
        let (service, blobs) = service();
        let profile = service.ensure(&user("u1")).await.unwrap();
        let pdf = || Upload {
            content_type: "application/pdf".into(),
            bytes: b"%PDF-1.4".to_vec(),
        };

        let first = service.upload_resume(&principal(&profile), pdf()).await.unwrap();
        let first_key = first.resume_path.clone().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = service.upload_resume(&principal(&profile), pdf()).await.unwrap();
        let second_key = second.resume_path.unwrap();

        assert_ne!(first_key, second_key);
        assert!(second_key.starts_with("resumes/u1/"));
        assert_eq!(blobs.keys().await, vec![second_key]);
    }

    #[tokio::test]
    async fn test_resume_upload_keeps_object_of_submitted_application() {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = ProfileService::new(store.clone(), blobs.clone(), Duration::from_secs(60));
        let profile = service.ensure(&user("s1")).await.unwrap();
        let pdf = || Upload {
            content_type: "application/pdf".into(),
            bytes: b"%PDF-1.4".to_vec(),
        };

        let first = service.upload_resume(&principal(&profile), pdf()).await.unwrap();
        let first_key = first.resume_path.clone().unwrap();
        let application = Application::new(
            JobId::from("job-1"),
            profile.id.clone(),
            None,
            Some(first_key.clone()),
            Utc::now(),
        );
        store.create_application(&application).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service.upload_resume(&principal(&profile), pdf()).await.unwrap();
        let second_key = second.resume_path.unwrap();

        assert_ne!(first_key, second_key);
        assert!(blobs.contains(&first_key).await);
        assert!(blobs.contains(&second_key).await);
    }

    #[tokio::test]
    async fn test_resume_url_denied_to_stranger() {
        let (service, _) = service();
        let owner = service.ensure(&user("u1")).await.unwrap();
        let stranger = service.ensure(&user("u2")).await.unwrap();
        service
            .upload_resume(
                &principal(&owner),
                Upload {
                    content_type: "application/pdf".into(),
                    bytes: b"%PDF".to_vec(),
                },
            )
            .await
            .unwrap();

        assert!(service.resume_url(&principal(&owner), &owner.id).await.is_ok());
        let err = service.resume_url(&principal(&stranger), &owner.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(Message::RowDenied(Resource::Profile))));
    }
}
