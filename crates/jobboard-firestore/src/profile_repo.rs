//! Repository for user profiles, keyed by the identity provider uid.

use std::collections::HashMap;

use tracing::info;

use jobboard_models::query::ProfileFilter;
use jobboard_models::{Profile, UserId};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::query::{QueryBuilder, SortDirection};
use crate::types::{Document, ToFirestoreValue, Value};

pub const PROFILES_COLLECTION: &str = "profiles";

#[derive(Clone)]
pub struct ProfileRepository {
    client: FirestoreClient,
}

impl ProfileRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &UserId) -> FirestoreResult<Option<Profile>> {
        match self.client.get_document(PROFILES_COLLECTION, id.as_str()).await? {
            Some(doc) => Ok(Some(document_to_profile(&doc, id)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, profile: &Profile) -> FirestoreResult<()> {
        self.client
            .create_document(PROFILES_COLLECTION, profile.id.as_str(), profile_to_fields(profile))
            .await?;
        info!(uid = %profile.id, "Created profile document");
        Ok(())
    }

    pub async fn save(&self, profile: &Profile) -> FirestoreResult<()> {
        self.client
            .update_document(PROFILES_COLLECTION, profile.id.as_str(), profile_to_fields(profile), None)
            .await?;
        Ok(())
    }

    pub async fn list(&self, filter: &ProfileFilter) -> FirestoreResult<Vec<Profile>> {
        let query = QueryBuilder::collection(PROFILES_COLLECTION)
            .eq_opt("role", filter.role.map(|r| r.as_str().to_firestore_value()))
            .eq_opt("active", filter.active.map(|a| a.to_firestore_value()))
            .order_by("created_at", SortDirection::Descending)
            .build();

        self.client
            .run_query("", query)
            .await?
            .iter()
            .map(|doc| document_to_profile(doc, &UserId::from(doc.id().unwrap_or_default())))
            .collect()
    }
}

fn profile_to_fields(profile: &Profile) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("email".to_string(), profile.email.to_firestore_value());
    fields.insert("full_name".to_string(), profile.full_name.to_firestore_value());
    fields.insert("headline".to_string(), profile.headline.to_firestore_value());
    fields.insert("phone".to_string(), profile.phone.to_firestore_value());
    fields.insert("resume_path".to_string(), profile.resume_path.to_firestore_value());
    fields.insert("role".to_string(), profile.role.as_str().to_firestore_value());
    fields.insert("active".to_string(), profile.active.to_firestore_value());
    fields.insert("registered".to_string(), profile.registered.to_firestore_value());
    fields.insert("created_at".to_string(), profile.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), profile.updated_at.to_firestore_value());
    fields
}

fn document_to_profile(doc: &Document, id: &UserId) -> FirestoreResult<Profile> {
    let f = doc.reader()?;
    Ok(Profile {
        id: id.clone(),
        email: f.opt("email"),
        full_name: f.opt("full_name"),
        headline: f.opt("headline"),
        phone: f.opt("phone"),
        resume_path: f.opt("resume_path"),
        // Rows written before roles existed read as job seekers
        role: f.parse_opt("role").unwrap_or_default(),
        active: f.bool_or("active", true),
        registered: f.bool_or("registered", false),
        created_at: f.req("created_at")?,
        updated_at: f.req("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jobboard_models::UserRole;

    #[test]
    fn test_profile_defaults_when_fields_missing() {
        let now = Utc::now();
        let mut fields = HashMap::new();
        fields.insert("created_at".to_string(), now.to_firestore_value());
        fields.insert("updated_at".to_string(), now.to_firestore_value());
        let parsed = document_to_profile(&Document::new(fields), &UserId::from("u1")).unwrap();
        assert_eq!(parsed.role, UserRole::JobSeeker);
        assert!(parsed.active);
    }

    #[test]
    fn test_profile_round_trip_keeps_role() {
        let mut profile = Profile::first_seen(UserId::from("u1"), Some("a@b.c".into()), Utc::now());
        profile.role = UserRole::Admin;
        profile.active = false;
        let parsed = document_to_profile(&Document::new(profile_to_fields(&profile)), &profile.id).unwrap();
        assert_eq!(parsed.role, UserRole::Admin);
        assert!(!parsed.active);
        assert_eq!(parsed.email.as_deref(), Some("a@b.c"));
    }
}
