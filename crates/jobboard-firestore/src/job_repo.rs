//! Repository for job postings.

use std::collections::HashMap;

use tracing::{debug, info};

use jobboard_models::query::JobFilter;
use jobboard_models::{Job, JobId};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::query::{QueryBuilder, SortDirection};
use crate::types::{Document, ToFirestoreValue, Value};

pub const JOBS_COLLECTION: &str = "jobs";

/// Repository for job documents.
#[derive(Clone)]
pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &JobId) -> FirestoreResult<Option<Job>> {
        match self.client.get_document(JOBS_COLLECTION, id.as_str()).await? {
            Some(doc) => Ok(Some(document_to_job(&doc, id)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, job: &Job) -> FirestoreResult<()> {
        self.client
            .create_document(JOBS_COLLECTION, job.id.as_str(), job_to_fields(job))
            .await?;
        info!(job_id = %job.id, company_id = %job.company_id, "Created job document");
        Ok(())
    }

    /// Overwrite an existing job.
    pub async fn save(&self, job: &Job) -> FirestoreResult<()> {
        self.client
            .update_document(JOBS_COLLECTION, job.id.as_str(), job_to_fields(job), None)
            .await?;
        debug!(job_id = %job.id, status = %job.status, "Saved job document");
        Ok(())
    }

    pub async fn delete(&self, id: &JobId) -> FirestoreResult<()> {
        self.client.delete_document(JOBS_COLLECTION, id.as_str()).await
    }

    /// Jobs matching the equality filter, newest first.
    pub async fn list(&self, filter: &JobFilter) -> FirestoreResult<Vec<Job>> {
        let query = QueryBuilder::collection(JOBS_COLLECTION)
            .eq_opt("company_id", filter.company_id.as_ref().map(|c| c.as_str().to_firestore_value()))
            .eq_opt("status", filter.status.map(|s| s.as_str().to_firestore_value()))
            .order_by("created_at", SortDirection::Descending)
            .build();

        self.client
            .run_query("", query)
            .await?
            .iter()
            .map(|doc| {
                let id = JobId::from(doc.id().unwrap_or_default());
                document_to_job(doc, &id)
            })
            .collect()
    }
}

fn job_to_fields(job: &Job) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("company_id".to_string(), job.company_id.as_str().to_firestore_value());
    fields.insert("title".to_string(), job.title.to_firestore_value());
    fields.insert("description".to_string(), job.description.to_firestore_value());
    fields.insert("requirements".to_string(), job.requirements.to_firestore_value());
    fields.insert("location_id".to_string(), job.location_id.to_firestore_value());
    fields.insert("employment_type".to_string(), job.employment_type.as_str().to_firestore_value());
    fields.insert("experience_level".to_string(), job.experience_level.as_str().to_firestore_value());
    fields.insert("salary_min".to_string(), job.salary_min.to_firestore_value());
    fields.insert("salary_max".to_string(), job.salary_max.to_firestore_value());
    fields.insert("salary_currency".to_string(), job.salary_currency.to_firestore_value());
    fields.insert("application_deadline".to_string(), job.application_deadline.to_firestore_value());
    fields.insert("status".to_string(), job.status.as_str().to_firestore_value());
    fields.insert("rejection_reason".to_string(), job.rejection_reason.to_firestore_value());
    fields.insert("created_at".to_string(), job.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), job.updated_at.to_firestore_value());
    fields.insert("published_at".to_string(), job.published_at.to_firestore_value());
    fields
}

fn document_to_job(doc: &Document, id: &JobId) -> FirestoreResult<Job> {
    let f = doc.reader()?;
    Ok(Job {
        id: id.clone(),
        company_id: f.string("company_id").into(),
        title: f.string("title"),
        description: f.string("description"),
        requirements: f.opt("requirements"),
        location_id: f.opt("location_id"),
        employment_type: f.parse("employment_type")?,
        experience_level: f.parse("experience_level")?,
        salary_min: f.opt("salary_min"),
        salary_max: f.opt("salary_max"),
        salary_currency: f.string("salary_currency"),
        application_deadline: f.opt("application_deadline"),
        status: f.parse("status")?,
        rejection_reason: f.opt("rejection_reason"),
        created_at: f.req("created_at")?,
        updated_at: f.req("updated_at")?,
        published_at: f.opt("published_at"),
    })
}
