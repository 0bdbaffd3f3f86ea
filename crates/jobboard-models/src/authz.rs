//! Authorization gate.
//!
//! Every check takes the caller and the row as loaded from the store, with
//! `None` for a row that does not exist. A missing row and a row the caller
//! may not touch produce the same [`AccessDenied`] value, so callers cannot
//! probe for ids they do not own.

use thiserror::Error;

use crate::application::Application;
use crate::company::Company;
use crate::ids::UserId;
use crate::job::Job;
use crate::profile::{Profile, UserRole};

/// The authenticated (or not) party behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    User(Caller),
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub role: UserRole,
    pub active: bool,
}

impl Caller {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            role: profile.role,
            active: profile.active,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Which tier granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The caller acting on their own row
    SelfService,
    /// The company owner acting on the company or its jobs and applications
    Owner,
    Admin,
}

/// Kind of row a denial is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Profile,
    Company,
    Job,
    Application,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Profile => "profile",
            Resource::Company => "company",
            Resource::Job => "job",
            Resource::Application => "application",
        }
    }
}

/// A refused access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("authentication required")]
    Unauthenticated,

    #[error("account is deactivated")]
    Inactive,

    /// Missing row or row owned by someone else
    #[error("{} not found or access denied", .0.as_str())]
    Row(Resource),

    #[error("role {0} is not allowed to perform this action")]
    Role(UserRole),

    #[error("admin access required")]
    AdminOnly,

    #[error("admins cannot change their own role or active flag")]
    SelfProtection,
}

impl Principal {
    /// Authenticated, active caller.
    pub fn caller(&self) -> Result<&Caller, AccessDenied> {
        let caller = self.caller_allow_inactive()?;
        if !caller.active {
            return Err(AccessDenied::Inactive);
        }
        Ok(caller)
    }

    /// Authenticated caller, active or not. Only reading one's own profile
    /// goes through here.
    pub fn caller_allow_inactive(&self) -> Result<&Caller, AccessDenied> {
        match self {
            Principal::Anonymous => Err(AccessDenied::Unauthenticated),
            Principal::User(caller) => Ok(caller),
        }
    }

    /// Active caller whose role is one of `roles`. Admins always pass.
    pub fn require_role(&self, roles: &[UserRole]) -> Result<&Caller, AccessDenied> {
        let caller = self.caller()?;
        if caller.is_admin() || roles.contains(&caller.role) {
            Ok(caller)
        } else {
            Err(AccessDenied::Role(caller.role))
        }
    }

    pub fn require_admin(&self) -> Result<&Caller, AccessDenied> {
        let caller = self.caller()?;
        if caller.is_admin() {
            Ok(caller)
        } else {
            Err(AccessDenied::AdminOnly)
        }
    }

    /// Whether the caller is an active admin. Never fails.
    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::User(caller) if caller.active && caller.is_admin())
    }
}

/// Owner or admin on a company.
pub fn manage_company<'a>(caller: &Caller, company: Option<&'a Company>) -> Result<(&'a Company, Tier), AccessDenied> {
    match company {
        Some(company) if caller.is_admin() => Ok((company, Tier::Admin)),
        Some(company) if company.is_owned_by(&caller.id) => Ok((company, Tier::Owner)),
        _ => Err(AccessDenied::Row(Resource::Company)),
    }
}

/// Owner or admin on a job. `company` is the job's company.
pub fn manage_job<'a>(
    caller: &Caller,
    job: Option<&'a Job>,
    company: Option<&Company>,
) -> Result<(&'a Job, Tier), AccessDenied> {
    let Some(job) = job else {
        return Err(AccessDenied::Row(Resource::Job));
    };
    if caller.is_admin() {
        return Ok((job, Tier::Admin));
    }
    match company {
        Some(company) if company.id == job.company_id && company.is_owned_by(&caller.id) => Ok((job, Tier::Owner)),
        _ => Err(AccessDenied::Row(Resource::Job)),
    }
}

/// Read a job: public statuses for anyone, everything else for owner or admin.
pub fn view_job<'a>(
    principal: &Principal,
    job: Option<&'a Job>,
    company: Option<&Company>,
) -> Result<&'a Job, AccessDenied> {
    match job {
        Some(job) if job.status.is_public() => Ok(job),
        Some(_) => {
            let caller = principal.caller().map_err(|_| AccessDenied::Row(Resource::Job))?;
            manage_job(caller, job, company).map(|(job, _)| job)
        }
        None => Err(AccessDenied::Row(Resource::Job)),
    }
}

/// Applicant, owner of the job's company, or admin.
pub fn view_application<'a>(
    caller: &Caller,
    application: Option<&'a Application>,
    company: Option<&Company>,
) -> Result<(&'a Application, Tier), AccessDenied> {
    match application {
        Some(app) if app.applicant_id == caller.id => Ok((app, Tier::SelfService)),
        Some(app) => review_application(caller, Some(app), company),
        None => Err(AccessDenied::Row(Resource::Application)),
    }
}

/// Owner of the job's company, or admin.
pub fn review_application<'a>(
    caller: &Caller,
    application: Option<&'a Application>,
    company: Option<&Company>,
) -> Result<(&'a Application, Tier), AccessDenied> {
    match application {
        Some(app) if caller.is_admin() => Ok((app, Tier::Admin)),
        Some(app) if company.is_some_and(|c| c.is_owned_by(&caller.id)) => Ok((app, Tier::Owner)),
        _ => Err(AccessDenied::Row(Resource::Application)),
    }
}

/// The applicant alone.
pub fn own_application<'a>(caller: &Caller, application: Option<&'a Application>) -> Result<&'a Application, AccessDenied> {
    match application {
        Some(app) if app.applicant_id == caller.id => Ok(app),
        _ => Err(AccessDenied::Row(Resource::Application)),
    }
}

/// Admins may not change their own role or active flag, whatever the new value.
pub fn guard_self_protection(caller: &Caller, target: &UserId) -> Result<(), AccessDenied> {
    if &caller.id == target {
        Err(AccessDenied::SelfProtection)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::CompanyInput;
    use crate::job::JobStatus;
    use chrono::Utc;

    fn caller(id: &str, role: UserRole) -> Caller {
        Caller {
            id: UserId::from(id),
            role,
            active: true,
        }
    }

    fn company(owner: &str) -> Company {
        Company::from_input(
            UserId::from(owner),
            CompanyInput {
                name: "Acme".to_string(),
                description: None,
                website: None,
                size_id: None,
                industry_id: None,
                location_id: None,
            },
            Utc::now(),
        )
    }

    fn job_of(company: &Company, status: JobStatus) -> Job {
        let now = Utc::now();
        Job {
            id: "j1".into(),
            company_id: company.id.clone(),
            title: "Engineer".to_string(),
            description: "Build things that matter to people.".to_string(),
            requirements: None,
            location_id: None,
            employment_type: Default::default(),
            experience_level: Default::default(),
            salary_min: None,
            salary_max: None,
            salary_currency: "USD".to_string(),
            application_deadline: None,
            status,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    #[test]
    fn test_anonymous_and_inactive() {
        assert_eq!(Principal::Anonymous.caller(), Err(AccessDenied::Unauthenticated));

        let mut inactive = caller("u1", UserRole::Admin);
        inactive.active = false;
        let principal = Principal::User(inactive);
        assert_eq!(principal.caller(), Err(AccessDenied::Inactive));
        assert_eq!(principal.require_admin(), Err(AccessDenied::Inactive));
        assert!(principal.caller_allow_inactive().is_ok());
        assert!(!principal.is_admin());
    }

    #[test]
    fn test_missing_and_foreign_rows_are_indistinguishable() {
        let acme = company("owner");
        let job = job_of(&acme, JobStatus::Draft);
        let stranger = caller("stranger", UserRole::Employer);

        let foreign = manage_job(&stranger, Some(&job), Some(&acme)).unwrap_err();
        let missing = manage_job(&stranger, None, None).unwrap_err();
        assert_eq!(foreign, missing);
        assert_eq!(foreign.to_string(), missing.to_string());

        let foreign = manage_company(&stranger, Some(&acme)).unwrap_err();
        let missing = manage_company(&stranger, None).unwrap_err();
        assert_eq!(foreign, missing);
    }

    #[test]
    fn test_owner_and_admin_tiers() {
        let acme = company("owner");
        let job = job_of(&acme, JobStatus::Draft);
        let (_, tier) = manage_job(&caller("owner", UserRole::Employer), Some(&job), Some(&acme)).unwrap();
        assert_eq!(tier, Tier::Owner);
        let (_, tier) = manage_job(&caller("root", UserRole::Admin), Some(&job), None).unwrap();
        assert_eq!(tier, Tier::Admin);
    }

    #[test]
    fn test_draft_jobs_hidden_from_public() {
        let acme = company("owner");
        let draft = job_of(&acme, JobStatus::Draft);
        let published = job_of(&acme, JobStatus::Published);

        assert!(view_job(&Principal::Anonymous, Some(&published), None).is_ok());
        assert_eq!(
            view_job(&Principal::Anonymous, Some(&draft), Some(&acme)),
            Err(AccessDenied::Row(Resource::Job))
        );
        let owner = Principal::User(caller("owner", UserRole::Employer));
        assert!(view_job(&owner, Some(&draft), Some(&acme)).is_ok());
    }

    #[test]
    fn test_application_tiers() {
        let acme = company("owner");
        let app = Application::new("j1".into(), UserId::from("seeker"), None, None, Utc::now());

        let (_, tier) = view_application(&caller("seeker", UserRole::JobSeeker), Some(&app), None).unwrap();
        assert_eq!(tier, Tier::SelfService);
        let (_, tier) = view_application(&caller("owner", UserRole::Employer), Some(&app), Some(&acme)).unwrap();
        assert_eq!(tier, Tier::Owner);
        assert!(view_application(&caller("other", UserRole::Employer), Some(&app), Some(&acme)).is_err());

        // Reviewers cannot act as the applicant
        assert!(own_application(&caller("owner", UserRole::Employer), Some(&app)).is_err());
        assert!(own_application(&caller("seeker", UserRole::JobSeeker), Some(&app)).is_ok());
    }

    #[test]
    fn test_role_requirement() {
        let seeker = Principal::User(caller("s", UserRole::JobSeeker));
        assert_eq!(
            seeker.require_role(&[UserRole::Employer]),
            Err(AccessDenied::Role(UserRole::JobSeeker))
        );
        let admin = Principal::User(caller("a", UserRole::Admin));
        assert!(admin.require_role(&[UserRole::Employer]).is_ok());
        assert_eq!(seeker.require_admin(), Err(AccessDenied::AdminOnly));
    }

    #[test]
    fn test_self_protection() {
        let admin = caller("root", UserRole::Admin);
        assert_eq!(
            guard_self_protection(&admin, &UserId::from("root")),
            Err(AccessDenied::SelfProtection)
        );
        assert!(guard_self_protection(&admin, &UserId::from("other")).is_ok());
    }
}
