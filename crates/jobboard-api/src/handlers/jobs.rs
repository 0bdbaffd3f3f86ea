//! Job posting handlers.

use axum::extract::{Path, State};
use serde::Deserialize;

use jobboard_models::query::JobListQuery;
use jobboard_models::{CompanyId, Job, JobId, JobInput, Page};

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{QueryParams, ValidatedJson};
use crate::handlers::path_id;
use crate::response::{ok, Done, Envelope};
use crate::services::JobView;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateJobParams {
    /// Send for review right away instead of saving a draft
    #[serde(default)]
    pub submit: bool,
}

pub async fn create_job(
    State(state): State<AppState>,
    session: Session,
    Path(company_id): Path<String>,
    QueryParams(params): QueryParams<CreateJobParams>,
    ValidatedJson(input): ValidatedJson<JobInput>,
) -> ApiResult<Envelope<Job>> {
    let company_id: CompanyId = path_id(company_id)?;
    Ok(ok(state
        .jobs
        .create(&session.principal, &company_id, input, params.submit)
        .await?))
}

pub async fn update_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<JobInput>,
) -> ApiResult<Envelope<Job>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.jobs.update(&session.principal, &id, input).await?))
}

pub async fn submit_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Job>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.jobs.submit(&session.principal, &id).await?))
}

pub async fn close_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Job>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.jobs.close(&session.principal, &id).await?))
}

pub async fn archive_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Job>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.jobs.archive(&session.principal, &id).await?))
}

pub async fn delete_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Done>> {
    let id: JobId = path_id(id)?;
    state.jobs.delete(&session.principal, &id).await?;
    Ok(ok(Done::new(id)))
}

pub async fn get_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<JobView>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.jobs.get(&session.principal, &id).await?))
}

/// Public job board.
pub async fn list_jobs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<JobListQuery>,
) -> ApiResult<Envelope<Page<JobView>>> {
    Ok(ok(state.jobs.list_public(&query).await?))
}
