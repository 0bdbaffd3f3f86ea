//! Repository for companies.

use std::collections::HashMap;

use tracing::info;

use jobboard_models::query::CompanyFilter;
use jobboard_models::{Company, CompanyId};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::query::{QueryBuilder, SortDirection};
use crate::types::{Document, ToFirestoreValue, Value};

pub const COMPANIES_COLLECTION: &str = "companies";

/// Repository for company documents.
#[derive(Clone)]
pub struct CompanyRepository {
    client: FirestoreClient,
}

impl CompanyRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &CompanyId) -> FirestoreResult<Option<Company>> {
        match self.client.get_document(COMPANIES_COLLECTION, id.as_str()).await? {
            Some(doc) => Ok(Some(document_to_company(&doc, id)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, company: &Company) -> FirestoreResult<()> {
        self.client
            .create_document(COMPANIES_COLLECTION, company.id.as_str(), company_to_fields(company))
            .await?;
        info!(company_id = %company.id, owner_id = %company.owner_id, "Created company document");
        Ok(())
    }

    pub async fn save(&self, company: &Company) -> FirestoreResult<()> {
        self.client
            .update_document(COMPANIES_COLLECTION, company.id.as_str(), company_to_fields(company), None)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &CompanyId) -> FirestoreResult<()> {
        self.client.delete_document(COMPANIES_COLLECTION, id.as_str()).await
    }

    /// Companies matching the filter, by name.
    pub async fn list(&self, filter: &CompanyFilter) -> FirestoreResult<Vec<Company>> {
        let query = QueryBuilder::collection(COMPANIES_COLLECTION)
            .eq_opt("owner_id", filter.owner_id.as_ref().map(|o| o.as_str().to_firestore_value()))
            .eq_opt("verified", filter.verified.map(|v| v.to_firestore_value()))
            .order_by("name", SortDirection::Ascending)
            .build();

        self.client
            .run_query("", query)
            .await?
            .iter()
            .map(|doc| document_to_company(doc, &CompanyId::from(doc.id().unwrap_or_default())))
            .collect()
    }
}

fn company_to_fields(company: &Company) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("owner_id".to_string(), company.owner_id.as_str().to_firestore_value());
    fields.insert("name".to_string(), company.name.to_firestore_value());
    fields.insert("description".to_string(), company.description.to_firestore_value());
    fields.insert("website".to_string(), company.website.to_firestore_value());
    fields.insert("logo_path".to_string(), company.logo_path.to_firestore_value());
    fields.insert("size_id".to_string(), company.size_id.to_firestore_value());
    fields.insert("industry_id".to_string(), company.industry_id.to_firestore_value());
    fields.insert("location_id".to_string(), company.location_id.to_firestore_value());
    fields.insert("verified".to_string(), company.verified.to_firestore_value());
    fields.insert("verified_at".to_string(), company.verified_at.to_firestore_value());
    fields.insert("rejection_reason".to_string(), company.rejection_reason.to_firestore_value());
    fields.insert("created_at".to_string(), company.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), company.updated_at.to_firestore_value());
    fields
}

fn document_to_company(doc: &Document, id: &CompanyId) -> FirestoreResult<Company> {
    let f = doc.reader()?;
    Ok(Company {
        id: id.clone(),
        owner_id: f.string("owner_id").into(),
        name: f.string("name"),
        description: f.opt("description"),
        website: f.opt("website"),
        logo_path: f.opt("logo_path"),
        size_id: f.opt("size_id"),
        industry_id: f.opt("industry_id"),
        location_id: f.opt("location_id"),
        verified: f.bool_or("verified", false),
        verified_at: f.opt("verified_at"),
        rejection_reason: f.opt("rejection_reason"),
        created_at: f.req("created_at")?,
        updated_at: f.req("updated_at")?,
    })
}
