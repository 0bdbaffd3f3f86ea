//! User profiles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ParseEnumError;
use crate::ids::UserId;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    JobSeeker,
    Employer,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::JobSeeker, UserRole::Employer, UserRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "job_seeker",
            UserRole::Employer => "employer",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_seeker" => Ok(UserRole::JobSeeker),
            "employer" => Ok(UserRole::Employer),
            "admin" => Ok(UserRole::Admin),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

/// A user profile as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Object key of the current resume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub active: bool,
    /// False until the user picked a role through registration
    #[serde(default)]
    pub registered: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Profile {
    /// Profile created on first sight of an authenticated uid.
    pub fn first_seen(id: UserId, email: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            full_name: None,
            headline: None,
            phone: None,
            resume_path: None,
            role: UserRole::JobSeeker,
            active: true,
            registered: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of the one-time role selection.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterProfileRequest {
    pub role: UserRole,
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
}

/// Body of a profile edit.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 120))]
    pub full_name: Option<String>,
    #[validate(length(max = 200))]
    pub headline: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
}

/// Body of an admin role change.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

/// Body of an admin activation change.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_defaults() {
        let profile = Profile::first_seen(UserId::from("u1"), None, Utc::now());
        assert_eq!(profile.role, UserRole::JobSeeker);
        assert!(profile.active);
        assert!(!profile.registered);
    }

    #[test]
    fn test_role_parse() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superadmin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_missing_active_defaults_to_true() {
        let json = serde_json::json!({
            "id": "u1",
            "role": "employer",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });
        let profile: Profile = serde_json::from_value(json).unwrap();
        assert!(profile.active);
        assert_eq!(profile.role, UserRole::Employer);
    }
}
