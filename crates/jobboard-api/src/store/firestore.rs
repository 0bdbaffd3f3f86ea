use jobboard_firestore::{
    ApplicationRepository, AuditRepository, CompanyRepository, FirestoreClient, JobRepository, ProfileRepository,
    ReferenceRepository,
};
use jobboard_models::query::{ApplicationFilter, CompanyFilter, JobFilter, ProfileFilter};
use jobboard_models::{
    Application, ApplicationId, AuditEntry, Company, CompanyId, Job, JobId, Profile, ReferenceItem, ReferenceKind,
    UserId,
};

use super::{Store, StoreResult};

/// Firestore-backed store.
#[derive(Clone)]
pub struct FirestoreStore {
    client: FirestoreClient,
    profiles: ProfileRepository,
    companies: CompanyRepository,
    jobs: JobRepository,
    applications: ApplicationRepository,
    audit: AuditRepository,
    references: ReferenceRepository,
}

impl FirestoreStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            profiles: ProfileRepository::new(client.clone()),
            companies: CompanyRepository::new(client.clone()),
            jobs: JobRepository::new(client.clone()),
            applications: ApplicationRepository::new(client.clone()),
            audit: AuditRepository::new(client.clone()),
            references: ReferenceRepository::new(client.clone()),
            client,
        }
    }
}

#[axum::async_trait]
impl Store for FirestoreStore {
    async fn get_profile(&self, id: &UserId) -> StoreResult<Option<Profile>> {
        Ok(self.profiles.get(id).await?)
    }

    async fn create_profile(&self, profile: &Profile) -> StoreResult<()> {
        Ok(self.profiles.create(profile).await?)
    }

    async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        Ok(self.profiles.save(profile).await?)
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> StoreResult<Vec<Profile>> {
        Ok(self.profiles.list(filter).await?)
    }

    async fn get_company(&self, id: &CompanyId) -> StoreResult<Option<Company>> {
        Ok(self.companies.get(id).await?)
    }

    async fn create_company(&self, company: &Company) -> StoreResult<()> {
        Ok(self.companies.create(company).await?)
    }

    async fn save_company(&self, company: &Company) -> StoreResult<()> {
        Ok(self.companies.save(company).await?)
    }

    async fn delete_company(&self, id: &CompanyId) -> StoreResult<()> {
        Ok(self.companies.delete(id).await?)
    }

    async fn list_companies(&self, filter: &CompanyFilter) -> StoreResult<Vec<Company>> {
        Ok(self.companies.list(filter).await?)
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.get(id).await?)
    }

    async fn create_job(&self, job: &Job) -> StoreResult<()> {
        Ok(self.jobs.create(job).await?)
    }

    async fn save_job(&self, job: &Job) -> StoreResult<()> {
        Ok(self.jobs.save(job).await?)
    }

    async fn delete_job(&self, id: &JobId) -> StoreResult<()> {
        Ok(self.jobs.delete(id).await?)
    }

    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.list(filter).await?)
    }

    async fn get_application(&self, id: &ApplicationId) -> StoreResult<Option<Application>> {
        Ok(self.applications.get(id).await?)
    }

    async fn create_application(&self, application: &Application) -> StoreResult<()> {
        Ok(self.applications.create(application).await?)
    }

    async fn save_application(&self, application: &Application) -> StoreResult<()> {
        Ok(self.applications.save(application).await?)
    }

    async fn delete_application(&self, id: &ApplicationId) -> StoreResult<()> {
        Ok(self.applications.delete(id).await?)
    }

    async fn list_applications(&self, filter: &ApplicationFilter) -> StoreResult<Vec<Application>> {
        Ok(self.applications.list(filter).await?)
    }

    async fn append_audit(&self, entry: &AuditEntry) -> StoreResult<()> {
        Ok(self.audit.append(entry).await?)
    }

    async fn list_audit(&self, limit: usize) -> StoreResult<Vec<AuditEntry>> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        Ok(self.audit.list(limit).await?)
    }

    async fn list_references(&self, kind: ReferenceKind) -> StoreResult<Vec<ReferenceItem>> {
        Ok(self.references.list(kind).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        // A missing document still proves Firestore is reachable
        self.client.get_document("_health", "_check").await?;
        Ok(())
    }
}
