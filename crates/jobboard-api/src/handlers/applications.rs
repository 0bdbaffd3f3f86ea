//! Application handlers.

use axum::extract::{Path, State};

use jobboard_models::application::{ApplicationNotesRequest, ApplicationStatusRequest, ApplyRequest};
use jobboard_models::query::ApplicationListQuery;
use jobboard_models::{Application, ApplicationId, JobId, Page};

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{QueryParams, ValidatedJson};
use crate::handlers::path_id;
use crate::response::{ok, Envelope};
use crate::state::AppState;

pub async fn apply(
    State(state): State<AppState>,
    session: Session,
    Path(job_id): Path<String>,
    ValidatedJson(req): ValidatedJson<ApplyRequest>,
) -> ApiResult<Envelope<Application>> {
    let job_id: JobId = path_id(job_id)?;
    Ok(ok(state.applications.apply(&session.principal, &job_id, req).await?))
}

pub async fn list_my_applications(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<ApplicationListQuery>,
) -> ApiResult<Envelope<Page<Application>>> {
    Ok(ok(state.applications.list_mine(&session.principal, &query).await?))
}

pub async fn get_application(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Application>> {
    let id: ApplicationId = path_id(id)?;
    Ok(ok(state.applications.get(&session.principal, &id).await?))
}

pub async fn list_job_applications(
    State(state): State<AppState>,
    session: Session,
    Path(job_id): Path<String>,
    QueryParams(query): QueryParams<ApplicationListQuery>,
) -> ApiResult<Envelope<Page<Application>>> {
    let job_id: JobId = path_id(job_id)?;
    Ok(ok(state
        .applications
        .list_for_job(&session.principal, &job_id, &query)
        .await?))
}

pub async fn update_application_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ApplicationStatusRequest>,
) -> ApiResult<Envelope<Application>> {
    let id: ApplicationId = path_id(id)?;
    Ok(ok(state.applications.update_status(&session.principal, &id, req).await?))
}

pub async fn update_application_notes(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ApplicationNotesRequest>,
) -> ApiResult<Envelope<Application>> {
    let id: ApplicationId = path_id(id)?;
    Ok(ok(state.applications.update_notes(&session.principal, &id, req).await?))
}

pub async fn withdraw_application(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Application>> {
    let id: ApplicationId = path_id(id)?;
    Ok(ok(state.applications.withdraw(&session.principal, &id).await?))
}
