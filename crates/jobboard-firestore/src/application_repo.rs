//! Repository for job applications.
//!
//! Application ids are `<job_id>_<applicant_id>`, so a second submission for
//! the same pair fails in `create` with `AlreadyExists` even under a race.

use std::collections::HashMap;

use tracing::info;

use jobboard_models::query::ApplicationFilter;
use jobboard_models::{Application, ApplicationId};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::query::{QueryBuilder, SortDirection, MAX_IN_VALUES};
use crate::types::{Document, ToFirestoreValue, Value};

pub const APPLICATIONS_COLLECTION: &str = "applications";

/// Repository for application documents.
#[derive(Clone)]
pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &ApplicationId) -> FirestoreResult<Option<Application>> {
        match self.client.get_document(APPLICATIONS_COLLECTION, id.as_str()).await? {
            Some(doc) => Ok(Some(document_to_application(&doc, id)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, application: &Application) -> FirestoreResult<()> {
        self.client
            .create_document(
                APPLICATIONS_COLLECTION,
                application.id.as_str(),
                application_to_fields(application),
            )
            .await?;
        info!(
            application_id = %application.id,
            job_id = %application.job_id,
            "Created application document"
        );
        Ok(())
    }

    pub async fn save(&self, application: &Application) -> FirestoreResult<()> {
        self.client
            .update_document(
                APPLICATIONS_COLLECTION,
                application.id.as_str(),
                application_to_fields(application),
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &ApplicationId) -> FirestoreResult<()> {
        self.client.delete_document(APPLICATIONS_COLLECTION, id.as_str()).await
    }

    /// Applications matching the filter, newest first.
    ///
    /// A job-id set larger than the `IN` limit is split into several queries.
    pub async fn list(&self, filter: &ApplicationFilter) -> FirestoreResult<Vec<Application>> {
        let base = QueryBuilder::collection(APPLICATIONS_COLLECTION)
            .eq_opt(
                "applicant_id",
                filter.applicant_id.as_ref().map(|u| u.as_str().to_firestore_value()),
            )
            .eq_opt("status", filter.status.map(|s| s.as_str().to_firestore_value()));

        let queries = match &filter.job_ids {
            None => vec![base],
            Some(ids) if ids.is_empty() => return Ok(Vec::new()),
            Some(ids) => ids
                .chunks(MAX_IN_VALUES)
                .map(|chunk| {
                    let values = chunk.iter().map(|id| id.as_str().to_firestore_value()).collect();
                    base.clone().is_in("job_id", values)
                })
                .collect(),
        };

        let mut applications = Vec::new();
        for query in queries {
            let query = query.order_by("created_at", SortDirection::Descending).build();
            for doc in self.client.run_query("", query).await? {
                let id = ApplicationId::from(doc.id().unwrap_or_default());
                applications.push(document_to_application(&doc, &id)?);
            }
        }
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }
}

fn application_to_fields(app: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("job_id".to_string(), app.job_id.as_str().to_firestore_value());
    fields.insert("applicant_id".to_string(), app.applicant_id.as_str().to_firestore_value());
    fields.insert("status".to_string(), app.status.as_str().to_firestore_value());
    fields.insert("cover_letter".to_string(), app.cover_letter.to_firestore_value());
    fields.insert("resume_path".to_string(), app.resume_path.to_firestore_value());
    fields.insert("notes".to_string(), app.notes.to_firestore_value());
    fields.insert("created_at".to_string(), app.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), app.updated_at.to_firestore_value());
    fields.insert("reviewed_at".to_string(), app.reviewed_at.to_firestore_value());
    fields
}

fn document_to_application(doc: &Document, id: &ApplicationId) -> FirestoreResult<Application> {
    let f = doc.reader()?;
    Ok(Application {
        id: id.clone(),
        job_id: f.string("job_id").into(),
        applicant_id: f.string("applicant_id").into(),
        status: f.parse("status")?,
        cover_letter: f.opt("cover_letter"),
        resume_path: f.opt("resume_path"),
        notes: f.opt("notes"),
        created_at: f.req("created_at")?,
        updated_at: f.req("updated_at")?,
        reviewed_at: f.opt("reviewed_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jobboard_models::{ApplicationStatus, JobId, UserId};

    #[test]
    fn test_application_document_mapping() {
        let mut app = Application::new(
            JobId::from("j1"),
            UserId::from("u1"),
            Some("Hello".into()),
            Some("resumes/u1/cv.pdf".into()),
            Utc::now(),
        );
        app.status = ApplicationStatus::Interviewing;
        let doc = Document::new(application_to_fields(&app));
        let parsed = document_to_application(&doc, &app.id).unwrap();
        assert_eq!(parsed.status, ApplicationStatus::Interviewing);
        assert_eq!(parsed.resume_path.as_deref(), Some("resumes/u1/cv.pdf"));
        assert_eq!(parsed.notes, None);
        assert_eq!(parsed.applicant_id, UserId::from("u1"));
    }
}
