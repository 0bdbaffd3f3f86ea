//! Company handlers.

use axum::extract::{Multipart, Path, State};

use jobboard_models::query::{CompanyListQuery, JobListQuery};
use jobboard_models::{Company, CompanyId, CompanyInput, Page};

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{read_upload, QueryParams, ValidatedJson};
use crate::handlers::path_id;
use crate::response::{ok, Done, Envelope};
use crate::services::profile::SignedUrl;
use crate::services::JobView;
use crate::state::AppState;

pub async fn create_company(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(input): ValidatedJson<CompanyInput>,
) -> ApiResult<Envelope<Company>> {
    Ok(ok(state.companies.create(&session.principal, input).await?))
}

pub async fn update_company(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CompanyInput>,
) -> ApiResult<Envelope<Company>> {
    let id: CompanyId = path_id(id)?;
    Ok(ok(state.companies.update(&session.principal, &id, input).await?))
}

pub async fn delete_company(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Done>> {
    let id: CompanyId = path_id(id)?;
    state.companies.delete(&session.principal, &id).await?;
    Ok(ok(Done::new(id)))
}

pub async fn get_company(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Envelope<Company>> {
    let id: CompanyId = path_id(id)?;
    Ok(ok(state.companies.get(&id).await?))
}

pub async fn list_companies(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<CompanyListQuery>,
) -> ApiResult<Envelope<Page<Company>>> {
    Ok(ok(state.companies.list(&session.principal, &query).await?))
}

/// The caller's own company.
pub async fn get_my_company(State(state): State<AppState>, session: Session) -> ApiResult<Envelope<Company>> {
    Ok(ok(state.companies.mine(&session.principal).await?))
}

pub async fn upload_company_logo(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Envelope<Company>> {
    let id: CompanyId = path_id(id)?;
    let upload = read_upload(multipart).await?;
    Ok(ok(state.companies.upload_logo(&session.principal, &id, upload).await?))
}

pub async fn get_company_logo_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<SignedUrl>> {
    let id: CompanyId = path_id(id)?;
    Ok(ok(state.companies.logo_url(&id).await?))
}

/// All postings of a company; owner or admin.
pub async fn list_company_jobs(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<JobListQuery>,
) -> ApiResult<Envelope<Page<JobView>>> {
    let id: CompanyId = path_id(id)?;
    Ok(ok(state.jobs.list_company_jobs(&session.principal, &id, &query).await?))
}
