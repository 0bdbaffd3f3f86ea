//! Admin CSV/JSON exports.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use jobboard_models::export::{render, ExportEntity, ExportFile, ExportFormat};
use jobboard_models::query::{ApplicationFilter, CompanyFilter, JobFilter, ProfileFilter};
use jobboard_models::Principal;

use crate::error::{ApiError, ApiResult};
use crate::store::Store;

#[derive(Clone)]
pub struct ExportService {
    store: Arc<dyn Store>,
}

impl ExportService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Render every row of `entity` as a downloadable file.
    pub async fn export(&self, principal: &Principal, entity: ExportEntity, format: ExportFormat) -> ApiResult<ExportFile> {
        let admin = principal.require_admin()?;
        let today = Utc::now().date_naive();

        let (file, rows) = match entity {
            ExportEntity::Users => {
                let rows = self.store.list_profiles(&ProfileFilter::default()).await?;
                (render(entity, format, &rows, today), rows.len())
            }
            ExportEntity::Companies => {
                let rows = self.store.list_companies(&CompanyFilter::default()).await?;
                (render(entity, format, &rows, today), rows.len())
            }
            ExportEntity::Jobs => {
                let rows = self.store.list_jobs(&JobFilter::default()).await?;
                (render(entity, format, &rows, today), rows.len())
            }
            ExportEntity::Applications => {
                let rows = self.store.list_applications(&ApplicationFilter::default()).await?;
                (render(entity, format, &rows, today), rows.len())
            }
        };
        let file = file.map_err(|e| ApiError::internal(format!("export serialization failed: {e}")))?;

        info!(admin = %admin.id, entity = %entity, format = format.extension(), rows, "Export generated");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{admin, company, employer, Fixture};

    #[tokio::test]
    async fn test_csv_has_header_plus_rows() {
        let fx = Fixture::new();
        fx.insert_company(company("e1", "Acme, Inc.")).await;
        fx.insert_company(company("e2", "Globex")).await;

        let file = ExportService::new(fx.store.clone())
            .export(&admin("root"), ExportEntity::Companies, ExportFormat::Csv)
            .await
            .unwrap();
        assert_eq!(file.body.lines().count(), 3);
        assert!(file.body.contains("\"Acme, Inc.\""));
        assert!(file.filename.starts_with("companies_export_"));
        assert!(file.filename.ends_with(".csv"));
    }

    #[tokio::test]
    async fn test_json_export() {
        let fx = Fixture::new();
        fx.insert_company(company("e1", "Acme")).await;

        let file = ExportService::new(fx.store.clone())
            .export(&admin("root"), ExportEntity::Companies, ExportFormat::Json)
            .await
            .unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&file.body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(file.content_type, "application/json");
    }

    #[tokio::test]
    async fn test_export_is_admin_only() {
        let fx = Fixture::new();
        let err = ExportService::new(fx.store.clone())
            .export(&employer("e1"), ExportEntity::Users, ExportFormat::Csv)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");
    }
}
