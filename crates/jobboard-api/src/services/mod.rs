//! Business logic services.
//!
//! Each service loads rows from the [`Store`](crate::store::Store), runs the
//! authorization gate and status guard from `jobboard_models`, and writes the
//! result back. Handlers stay thin wrappers around these calls.

pub mod admin;
pub mod application;
pub mod audit;
pub mod company;
pub mod export;
pub mod job;
pub mod profile;
pub mod reference;
pub mod stats;

pub use admin::AdminService;
pub use application::ApplicationService;
pub use audit::AuditLog;
pub use company::CompanyService;
pub use export::ExportService;
pub use job::{JobService, JobView};
pub use profile::ProfileService;
pub use reference::ReferenceService;
pub use stats::StatsService;

#[cfg(test)]
pub(crate) mod fixtures {
    //! Rows and callers for service tests.

    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use jobboard_models::{
        Application, ApplicationStatus, Caller, Company, CompanyId, CompanyInput, EmploymentType, ExperienceLevel,
        Job, JobId, JobInput, JobStatus, Principal, UserId, UserRole,
    };

    use crate::store::{MemoryStore, Store};

    pub struct Fixture {
        pub store: Arc<MemoryStore>,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
            }
        }

        pub async fn insert_company(&self, company: Company) -> Company {
            self.store.create_company(&company).await.unwrap();
            company
        }

        pub async fn insert_job(&self, job: Job) -> Job {
            self.store.create_job(&job).await.unwrap();
            job
        }

        pub async fn insert_application(&self, application: Application) -> Application {
            self.store.create_application(&application).await.unwrap();
            application
        }
    }

    fn principal(uid: &str, role: UserRole) -> Principal {
        Principal::User(Caller {
            id: UserId::from(uid),
            role,
            active: true,
        })
    }

    pub fn admin(uid: &str) -> Principal {
        principal(uid, UserRole::Admin)
    }

    pub fn employer(uid: &str) -> Principal {
        principal(uid, UserRole::Employer)
    }

    pub fn seeker(uid: &str) -> Principal {
        principal(uid, UserRole::JobSeeker)
    }

    pub fn company(owner: &str, name: &str) -> Company {
        Company::from_input(
            UserId::from(owner),
            CompanyInput {
                name: name.into(),
                description: None,
                website: None,
                size_id: None,
                industry_id: Some("tech".into()),
                location_id: None,
            },
            Utc::now(),
        )
    }

    pub fn job_input(title: &str) -> JobInput {
        JobInput {
            title: title.into(),
            description: "Build and operate the payments backend.".into(),
            requirements: None,
            location_id: Some("remote".into()),
            employment_type: EmploymentType::FullTime,
            experience_level: ExperienceLevel::Mid,
            salary_min: Some(50_000),
            salary_max: Some(70_000),
            salary_currency: None,
            application_deadline: None,
        }
    }

    pub fn job(company_id: &CompanyId, status: JobStatus) -> Job {
        let mut job = Job::from_input(company_id.clone(), job_input("Backend Engineer"), status, Utc::now());
        if status == JobStatus::Published {
            job.published_at = Some(Utc::now() - Duration::days(1));
        }
        job
    }

    pub fn application(job_id: &JobId, applicant: &str, status: ApplicationStatus) -> Application {
        let mut application = Application::new(job_id.clone(), UserId::from(applicant), None, None, Utc::now());
        application.status = status;
        application
    }
}
