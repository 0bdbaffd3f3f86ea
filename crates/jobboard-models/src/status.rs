//! Status transition rules for jobs and applications.
//!
//! The guard functions are pure: they take the current status, the requested
//! status and who is asking, and return either the side effect to apply or a
//! [`TransitionError`]. The `transition` methods on [`Job`] and
//! [`Application`] run the guard and apply the effect in one step.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::application::{Application, ApplicationStatus};
use crate::job::{Job, JobStatus};

/// Who is moving a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobActor {
    /// Owner of the company the job belongs to
    Owner,
    Admin,
}

/// Who is moving an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationActor {
    Applicant,
    /// Company owner or admin
    Reviewer,
}

/// A refused status change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{entity} is already {status}")]
    Unchanged {
        entity: &'static str,
        status: &'static str,
    },

    #[error("{entity} cannot move from {from} to {to}")]
    NotAllowed {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },
}

impl TransitionError {
    fn job(from: JobStatus, to: JobStatus) -> Self {
        if from == to {
            TransitionError::Unchanged {
                entity: "job",
                status: from.as_str(),
            }
        } else {
            TransitionError::NotAllowed {
                entity: "job",
                from: from.as_str(),
                to: to.as_str(),
            }
        }
    }

    fn application(from: ApplicationStatus, to: ApplicationStatus) -> Self {
        if from == to {
            TransitionError::Unchanged {
                entity: "application",
                status: from.as_str(),
            }
        } else {
            TransitionError::NotAllowed {
                entity: "application",
                from: from.as_str(),
                to: to.as_str(),
            }
        }
    }
}

/// Side effect of an allowed job transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEffect {
    None,
    /// Stamp `published_at` and clear any earlier rejection
    Publish,
    /// Store the admin's rejection reason
    RecordRejection,
    /// Clear a previous rejection reason on resubmission
    ClearRejection,
}

/// Side effect of an allowed application transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationEffect {
    None,
    /// First review decision; stamp `reviewed_at`
    MarkReviewed,
}

/// Check a job transition.
pub fn check_job_transition(from: JobStatus, to: JobStatus, actor: JobActor) -> Result<JobEffect, TransitionError> {
    use JobStatus::*;

    if from == to || from.is_terminal() {
        return Err(TransitionError::job(from, to));
    }

    let effect = match (from, to, actor) {
        (Draft, PendingApproval, JobActor::Owner) => JobEffect::ClearRejection,
        (Draft | PendingApproval, Published, JobActor::Admin) => JobEffect::Publish,
        (PendingApproval, Draft, JobActor::Admin) => JobEffect::RecordRejection,
        (Published, Closed, _) => JobEffect::None,
        (_, Archived, _) => JobEffect::None,
        _ => return Err(TransitionError::job(from, to)),
    };
    Ok(effect)
}

/// Check an application transition.
pub fn check_application_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
    actor: ApplicationActor,
) -> Result<ApplicationEffect, TransitionError> {
    use ApplicationStatus::*;

    if from == to || from.is_terminal() {
        return Err(TransitionError::application(from, to));
    }

    let allowed = match actor {
        ApplicationActor::Applicant => to == Withdrawn,
        ApplicationActor::Reviewer => match from {
            Pending => matches!(to, Reviewing | Interviewing | Accepted | Rejected),
            Reviewing => matches!(to, Interviewing | Accepted | Rejected),
            Interviewing => matches!(to, Accepted | Rejected),
            Accepted | Rejected | Withdrawn => false,
        },
    };

    if !allowed {
        return Err(TransitionError::application(from, to));
    }

    if from == Pending && actor == ApplicationActor::Reviewer {
        Ok(ApplicationEffect::MarkReviewed)
    } else {
        Ok(ApplicationEffect::None)
    }
}

impl Job {
    /// Move to `to`, applying the transition's side effect.
    ///
    /// `reason` is stored only by an admin rejection.
    pub fn transition(
        &mut self,
        to: JobStatus,
        actor: JobActor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<JobEffect, TransitionError> {
        let effect = check_job_transition(self.status, to, actor)?;
        match effect {
            JobEffect::Publish => {
                self.published_at = Some(now);
                self.rejection_reason = None;
            }
            JobEffect::RecordRejection => self.rejection_reason = reason,
            JobEffect::ClearRejection => self.rejection_reason = None,
            JobEffect::None => {}
        }
        self.status = to;
        self.updated_at = now;
        Ok(effect)
    }
}

impl Application {
    /// Move to `to`, applying the transition's side effect.
    pub fn transition(
        &mut self,
        to: ApplicationStatus,
        actor: ApplicationActor,
        now: DateTime<Utc>,
    ) -> Result<ApplicationEffect, TransitionError> {
        let effect = check_application_transition(self.status, to, actor)?;
        if effect == ApplicationEffect::MarkReviewed && self.reviewed_at.is_none() {
            self.reviewed_at = Some(now);
        }
        self.status = to;
        self.updated_at = now;
        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{JobId, UserId};
    use ApplicationStatus as A;
    use JobStatus as J;

    #[test]
    fn test_job_transition_table() {
        assert_eq!(
            check_job_transition(J::Draft, J::PendingApproval, JobActor::Owner),
            Ok(JobEffect::ClearRejection)
        );
        assert_eq!(
            check_job_transition(J::PendingApproval, J::Published, JobActor::Admin),
            Ok(JobEffect::Publish)
        );
        assert_eq!(
            check_job_transition(J::Draft, J::Published, JobActor::Admin),
            Ok(JobEffect::Publish)
        );
        assert_eq!(
            check_job_transition(J::PendingApproval, J::Draft, JobActor::Admin),
            Ok(JobEffect::RecordRejection)
        );
        assert!(check_job_transition(J::Published, J::Closed, JobActor::Owner).is_ok());
        assert!(check_job_transition(J::Closed, J::Archived, JobActor::Admin).is_ok());

        // Owners cannot publish their own postings
        assert!(check_job_transition(J::PendingApproval, J::Published, JobActor::Owner).is_err());
        assert!(check_job_transition(J::Closed, J::Published, JobActor::Admin).is_err());
        assert!(check_job_transition(J::Draft, J::Closed, JobActor::Owner).is_err());
    }

    #[test]
    fn test_archived_is_terminal() {
        for to in J::ALL {
            for actor in [JobActor::Owner, JobActor::Admin] {
                assert!(check_job_transition(J::Archived, to, actor).is_err());
            }
        }
    }

    #[test]
    fn test_same_state_is_unchanged_error() {
        assert_eq!(
            check_job_transition(J::Published, J::Published, JobActor::Admin),
            Err(TransitionError::Unchanged {
                entity: "job",
                status: "published"
            })
        );
    }

    #[test]
    fn test_only_publish_sets_published_at() {
        let now = Utc::now();
        for from in J::ALL {
            for to in J::ALL {
                for actor in [JobActor::Owner, JobActor::Admin] {
                    let mut job = sample_job(from);
                    if job.transition(to, actor, None, now).is_ok() {
                        assert_eq!(job.published_at.is_some(), to == J::Published, "{from} -> {to}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_rejection_records_reason() {
        let mut job = sample_job(J::PendingApproval);
        job.transition(J::Draft, JobActor::Admin, Some("missing salary".into()), Utc::now())
            .unwrap();
        assert_eq!(job.status, J::Draft);
        assert_eq!(job.rejection_reason.as_deref(), Some("missing salary"));

        job.transition(J::PendingApproval, JobActor::Owner, None, Utc::now()).unwrap();
        assert_eq!(job.rejection_reason, None);
    }

    #[test]
    fn test_decided_applications_are_frozen() {
        for from in [A::Accepted, A::Rejected, A::Withdrawn] {
            for to in A::ALL {
                for actor in [ApplicationActor::Applicant, ApplicationActor::Reviewer] {
                    assert!(check_application_transition(from, to, actor).is_err(), "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn test_reviewer_paths() {
        let r = ApplicationActor::Reviewer;
        assert_eq!(check_application_transition(A::Pending, A::Reviewing, r), Ok(ApplicationEffect::MarkReviewed));
        assert_eq!(check_application_transition(A::Reviewing, A::Interviewing, r), Ok(ApplicationEffect::None));
        assert!(check_application_transition(A::Interviewing, A::Accepted, r).is_ok());
        assert!(check_application_transition(A::Interviewing, A::Reviewing, r).is_err());
        assert!(check_application_transition(A::Pending, A::Withdrawn, r).is_err());
    }

    #[test]
    fn test_only_applicant_withdraws() {
        let a = ApplicationActor::Applicant;
        for from in [A::Pending, A::Reviewing, A::Interviewing] {
            assert!(check_application_transition(from, A::Withdrawn, a).is_ok());
        }
        assert!(check_application_transition(A::Pending, A::Accepted, a).is_err());
    }

    #[test]
    fn test_reviewed_at_set_once() {
        let mut app = Application::new(JobId::from("j"), UserId::from("u"), None, None, Utc::now());
        let first = Utc::now();
        app.transition(A::Reviewing, ApplicationActor::Reviewer, first).unwrap();
        assert_eq!(app.reviewed_at, Some(first));
        app.transition(A::Interviewing, ApplicationActor::Reviewer, first + chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(app.reviewed_at, Some(first));
    }

    fn sample_job(status: JobStatus) -> Job {
        let now = Utc::now();
        Job {
            id: JobId::new(),
            company_id: "c1".into(),
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
}
