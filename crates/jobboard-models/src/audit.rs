//! Admin audit trail.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ParseEnumError;
use crate::ids::UserId;

/// Admin action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ApproveJob,
    RejectJob,
    ArchiveJob,
    DeleteJob,
    VerifyCompany,
    RejectCompany,
    DeleteCompany,
    SetUserRole,
    SetUserActive,
}

impl AuditAction {
    pub const ALL: [AuditAction; 9] = [
        AuditAction::ApproveJob,
        AuditAction::RejectJob,
        AuditAction::ArchiveJob,
        AuditAction::DeleteJob,
        AuditAction::VerifyCompany,
        AuditAction::RejectCompany,
        AuditAction::DeleteCompany,
        AuditAction::SetUserRole,
        AuditAction::SetUserActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ApproveJob => "approve_job",
            AuditAction::RejectJob => "reject_job",
            AuditAction::ArchiveJob => "archive_job",
            AuditAction::DeleteJob => "delete_job",
            AuditAction::VerifyCompany => "verify_company",
            AuditAction::RejectCompany => "reject_company",
            AuditAction::DeleteCompany => "delete_company",
            AuditAction::SetUserRole => "set_user_role",
            AuditAction::SetUserActive => "set_user_active",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("audit action", s))
    }
}

/// Kind of row an audit entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Job,
    Company,
    User,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Job => "job",
            TargetType::Company => "company",
            TargetType::User => "user",
        }
    }
}

impl FromStr for TargetType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job" => Ok(TargetType::Job),
            "company" => Ok(TargetType::Company),
            "user" => Ok(TargetType::User),
            other => Err(ParseEnumError::new("target type", other)),
        }
    }
}

/// One admin mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditEntry {
    pub id: String,
    pub actor_id: UserId,
    pub action: AuditAction,
    pub target_type: TargetType,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor_id: UserId,
        action: AuditAction,
        target_type: TargetType,
        target_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            actor_id,
            action,
            target_type,
            target_id: target_id.into(),
            reason: None,
            created_at: now,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_action_name() {
        let entry = AuditEntry::new(
            UserId::from("admin"),
            AuditAction::RejectCompany,
            TargetType::Company,
            "c1",
            Utc::now(),
        )
        .with_reason("unverifiable address");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "reject_company");
        assert_eq!(json["target_type"], "company");
        assert_eq!(json["reason"], "unverifiable address");
    }

    #[test]
    fn test_action_names_parse_back() {
        for action in AuditAction::ALL {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
        assert!("drop_tables".parse::<AuditAction>().is_err());
    }
}
