use std::collections::HashMap;

use tokio::sync::RwLock;

use jobboard_models::query::{ApplicationFilter, CompanyFilter, JobFilter, ProfileFilter};
use jobboard_models::{
    Application, ApplicationId, AuditEntry, Company, CompanyId, Job, JobId, Profile, ReferenceItem, ReferenceKind,
    UserId,
};

use super::{Store, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    companies: HashMap<CompanyId, Company>,
    jobs: HashMap<JobId, Job>,
    applications: HashMap<ApplicationId, Application>,
    audit: Vec<AuditEntry>,
    references: Vec<ReferenceItem>,
}

/// In-process store with the same semantics as [`super::FirestoreStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a reference list.
    pub async fn insert_reference(&self, item: ReferenceItem) {
        self.tables.write().await.references.push(item);
    }
}

fn insert_new<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> StoreResult<()>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
{
    if map.contains_key(&key) {
        return Err(StoreError::AlreadyExists(key.to_string()));
    }
    map.insert(key, value);
    Ok(())
}

fn replace<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> StoreResult<()>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
{
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(StoreError::NotFound(key.to_string())),
    }
}

#[axum::async_trait]
impl Store for MemoryStore {
    async fn get_profile(&self, id: &UserId) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(id).cloned())
    }

    async fn create_profile(&self, profile: &Profile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.profiles, profile.id.clone(), profile.clone())
    }

    async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.profiles, profile.id.clone(), profile.clone())
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> StoreResult<Vec<Profile>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| filter.role.map_or(true, |r| p.role == r))
            .filter(|p| filter.active.map_or(true, |a| p.active == a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_company(&self, id: &CompanyId) -> StoreResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(id).cloned())
    }

    async fn create_company(&self, company: &Company) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.companies, company.id.clone(), company.clone())
    }

    async fn save_company(&self, company: &Company) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.companies, company.id.clone(), company.clone())
    }

    async fn delete_company(&self, id: &CompanyId) -> StoreResult<()> {
        self.tables.write().await.companies.remove(id);
        Ok(())
    }

    async fn list_companies(&self, filter: &CompanyFilter) -> StoreResult<Vec<Company>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Company> = tables
            .companies
            .values()
            .filter(|c| filter.owner_id.as_ref().map_or(true, |o| &c.owner_id == o))
            .filter(|c| filter.verified.map_or(true, |v| c.verified == v))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.tables.read().await.jobs.get(id).cloned())
    }

    async fn create_job(&self, job: &Job) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.jobs, job.id.clone(), job.clone())
    }

    async fn save_job(&self, job: &Job) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.jobs, job.id.clone(), job.clone())
    }

    async fn delete_job(&self, id: &JobId) -> StoreResult<()> {
        self.tables.write().await.jobs.remove(id);
        Ok(())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Job> = tables
            .jobs
            .values()
            .filter(|j| filter.company_id.as_ref().map_or(true, |c| &j.company_id == c))
            .filter(|j| filter.status.map_or(true, |s| j.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_application(&self, id: &ApplicationId) -> StoreResult<Option<Application>> {
        Ok(self.tables.read().await.applications.get(id).cloned())
    }

    async fn create_application(&self, application: &Application) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        insert_new(&mut tables.applications, application.id.clone(), application.clone())
    }

    async fn save_application(&self, application: &Application) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.applications, application.id.clone(), application.clone())
    }

    async fn delete_application(&self, id: &ApplicationId) -> StoreResult<()> {
        self.tables.write().await.applications.remove(id);
        Ok(())
    }

    async fn list_applications(&self, filter: &ApplicationFilter) -> StoreResult<Vec<Application>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Application> = tables
            .applications
            .values()
            .filter(|a| filter.job_ids.as_ref().map_or(true, |ids| ids.contains(&a.job_id)))
            .filter(|a| filter.applicant_id.as_ref().map_or(true, |u| &a.applicant_id == u))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn append_audit(&self, entry: &AuditEntry) -> StoreResult<()> {
        self.tables.write().await.audit.push(entry.clone());
        Ok(())
    }

    async fn list_audit(&self, limit: usize) -> StoreResult<Vec<AuditEntry>> {
        let tables = self.tables.read().await;
        let mut rows = tables.audit.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_references(&self, kind: ReferenceKind) -> StoreResult<Vec<ReferenceItem>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<ReferenceItem> = tables.references.iter().filter(|r| r.kind == kind).cloned().collect();
        rows.sort_by_key(|r| r.sort_order);
        Ok(rows)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_create_is_create_if_absent() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let app = Application::new(JobId::from("j1"), UserId::from("u1"), None, None, now);
        store.create_application(&app).await.unwrap();
        let again = store.create_application(&app).await.unwrap_err();
        assert!(matches!(again, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_save_requires_existing_row() {
        let store = MemoryStore::new();
        let profile = Profile::first_seen(UserId::from("u1"), None, Utc::now());
        assert!(matches!(
            store.save_profile(&profile).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_application_filters_and_order() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let older = Application::new(JobId::from("j1"), UserId::from("u1"), None, None, now - Duration::hours(1));
        let newer = Application::new(JobId::from("j2"), UserId::from("u1"), None, None, now);
        let other = Application::new(JobId::from("j3"), UserId::from("u2"), None, None, now);
        for app in [&older, &newer, &other] {
            store.create_application(app).await.unwrap();
        }

        let mine = store
            .list_applications(&ApplicationFilter {
                applicant_id: Some(UserId::from("u1")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.iter().map(|a| a.job_id.as_str()).collect::<Vec<_>>(), vec!["j2", "j1"]);

        let none = store
            .list_applications(&ApplicationFilter {
                job_ids: Some(vec![]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_references_sorted_by_order() {
        let store = MemoryStore::new();
        for (id, order) in [("b", 2), ("a", 1)] {
            store
                .insert_reference(ReferenceItem {
                    id: id.to_string(),
                    kind: ReferenceKind::Industry,
                    name: id.to_uppercase(),
                    sort_order: order,
                })
                .await;
        }
        let items = store.list_references(ReferenceKind::Industry).await.unwrap();
        assert_eq!(items[0].id, "a");
        assert!(store.list_references(ReferenceKind::Location).await.unwrap().is_empty());
    }
}
