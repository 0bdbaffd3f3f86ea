//! Typed identifiers for stored rows.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Create from an existing string.
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

row_id!(
    /// Job posting identifier.
    JobId
);
row_id!(
    /// Job application identifier.
    ApplicationId
);
row_id!(
    /// Company identifier.
    CompanyId
);
row_id!(
    /// User identifier. Equal to the identity provider's uid.
    UserId
);

impl ApplicationId {
    /// Deterministic id for the (job, applicant) pair.
    ///
    /// Creating a document under this id fails with a conflict when the
    /// applicant already applied, so duplicates are settled by the store.
    pub fn for_pair(job_id: &JobId, applicant_id: &UserId) -> Self {
        Self(format!("{}_{}", job_id.as_str(), applicant_id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_application_id_for_pair_is_stable() {
        let job = JobId::from("job-1");
        let user = UserId::from("user-9");
        assert_eq!(ApplicationId::for_pair(&job, &user).as_str(), "job-1_user-9");
        assert_eq!(
            ApplicationId::for_pair(&job, &user),
            ApplicationId::for_pair(&job, &user)
        );
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = CompanyId::from("c-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"c-1\"");
    }
}
