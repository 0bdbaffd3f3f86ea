//! Companies and their lookup references.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ParseEnumError;
use crate::ids::{CompanyId, UserId};

/// A company as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Company {
    pub id: CompanyId,
    /// Row owner for owner-service checks
    pub owner_id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Object key of the uploaded logo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn from_input(owner_id: UserId, input: CompanyInput, now: DateTime<Utc>) -> Self {
        let mut company = Self {
            id: CompanyId::new(),
            owner_id,
            name: String::new(),
            description: None,
            website: None,
            logo_path: None,
            size_id: None,
            industry_id: None,
            location_id: None,
            verified: false,
            verified_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        company.apply_input(input, now);
        company
    }

    pub fn apply_input(&mut self, input: CompanyInput, now: DateTime<Utc>) {
        self.name = input.name.trim().to_string();
        self.description = non_blank(input.description);
        self.website = non_blank(input.website);
        self.size_id = non_blank(input.size_id);
        self.industry_id = non_blank(input.industry_id);
        self.location_id = non_blank(input.location_id);
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Editable fields of a company.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompanyInput {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 64))]
    pub size_id: Option<String>,
    #[validate(length(max = 64))]
    pub industry_id: Option<String>,
    #[validate(length(max = 64))]
    pub location_id: Option<String>,
}

/// Body of an admin moderation decision that needs a reason.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModerationReason {
    #[validate(length(min = 3, max = 1000))]
    pub reason: String,
}

/// Kind of lookup list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Industry,
    Location,
    CompanySize,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Industry => "industry",
            ReferenceKind::Location => "location",
            ReferenceKind::CompanySize => "company_size",
        }
    }

    /// Collection holding this lookup list.
    pub fn collection(&self) -> &'static str {
        match self {
            ReferenceKind::Industry => "industries",
            ReferenceKind::Location => "locations",
            ReferenceKind::CompanySize => "company_sizes",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReferenceKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "industry" | "industries" => Ok(ReferenceKind::Industry),
            "location" | "locations" => Ok(ReferenceKind::Location),
            "company_size" | "company_sizes" => Ok(ReferenceKind::CompanySize),
            other => Err(ParseEnumError::new("reference kind", other)),
        }
    }
}

/// One entry of a lookup list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceItem {
    pub id: String,
    pub kind: ReferenceKind,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CompanyInput {
        CompanyInput {
            name: " Acme Labs ".to_string(),
            description: Some("".to_string()),
            website: Some("https://acme.example".to_string()),
            size_id: None,
            industry_id: Some("software".to_string()),
            location_id: None,
        }
    }

    #[test]
    fn test_from_input_starts_unverified() {
        let company = Company::from_input(UserId::from("owner"), input(), Utc::now());
        assert!(!company.verified);
        assert_eq!(company.name, "Acme Labs");
        assert_eq!(company.description, None);
        assert!(company.is_owned_by(&UserId::from("owner")));
        assert!(!company.is_owned_by(&UserId::from("other")));
    }

    #[test]
    fn test_invalid_website_is_rejected() {
        let mut bad = input();
        bad.website = Some("not a url".to_string());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reference_kind_accepts_plural() {
        assert_eq!("industries".parse::<ReferenceKind>().unwrap(), ReferenceKind::Industry);
        assert_eq!(ReferenceKind::CompanySize.collection(), "company_sizes");
    }
}
