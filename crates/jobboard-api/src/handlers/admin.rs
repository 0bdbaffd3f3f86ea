//! Admin moderation, user management and listings.

use axum::extract::{Path, State};

use jobboard_models::company::ModerationReason;
use jobboard_models::profile::{SetActiveRequest, SetRoleRequest};
use jobboard_models::query::{
    ApplicationListQuery, AuditListQuery, CompanyListQuery, JobListQuery, UserListQuery,
};
use jobboard_models::{Application, AuditEntry, Company, CompanyId, Job, JobId, Page, Profile, UserId};

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{QueryParams, ValidatedJson};
use crate::handlers::path_id;
use crate::response::{ok, Envelope};
use crate::services::JobView;
use crate::state::AppState;

// Jobs

pub async fn approve_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Job>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.admin.approve_job(&session.principal, &id).await?))
}

pub async fn reject_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ModerationReason>,
) -> ApiResult<Envelope<Job>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.admin.reject_job(&session.principal, &id, req).await?))
}

pub async fn admin_archive_job(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Job>> {
    let id: JobId = path_id(id)?;
    Ok(ok(state.admin.archive_job(&session.principal, &id).await?))
}

pub async fn admin_list_jobs(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<JobListQuery>,
) -> ApiResult<Envelope<Page<JobView>>> {
    Ok(ok(state.admin.list_jobs(&session.principal, &query).await?))
}

// Companies

pub async fn verify_company(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Company>> {
    let id: CompanyId = path_id(id)?;
    Ok(ok(state.admin.verify_company(&session.principal, &id).await?))
}

pub async fn reject_company(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ModerationReason>,
) -> ApiResult<Envelope<Company>> {
    let id: CompanyId = path_id(id)?;
    Ok(ok(state.admin.reject_company(&session.principal, &id, req).await?))
}

pub async fn admin_list_companies(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<CompanyListQuery>,
) -> ApiResult<Envelope<Page<Company>>> {
    Ok(ok(state.admin.list_companies(&session.principal, &query).await?))
}

// Users

pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<UserListQuery>,
) -> ApiResult<Envelope<Page<Profile>>> {
    Ok(ok(state.admin.list_users(&session.principal, &query).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    session: Session,
    Path(uid): Path<String>,
) -> ApiResult<Envelope<Profile>> {
    let uid: UserId = path_id(uid)?;
    Ok(ok(state.admin.get_user(&session.principal, &uid).await?))
}

pub async fn set_user_role(
    State(state): State<AppState>,
    session: Session,
    Path(uid): Path<String>,
    ValidatedJson(req): ValidatedJson<SetRoleRequest>,
) -> ApiResult<Envelope<Profile>> {
    let uid: UserId = path_id(uid)?;
    Ok(ok(state.admin.set_user_role(&session.principal, &uid, req).await?))
}

pub async fn set_user_active(
    State(state): State<AppState>,
    session: Session,
    Path(uid): Path<String>,
    ValidatedJson(req): ValidatedJson<SetActiveRequest>,
) -> ApiResult<Envelope<Profile>> {
    let uid: UserId = path_id(uid)?;
    Ok(ok(state.admin.set_user_active(&session.principal, &uid, req).await?))
}

// Audit and applications

pub async fn list_audit_log(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<AuditListQuery>,
) -> ApiResult<Envelope<Page<AuditEntry>>> {
    Ok(ok(state.admin.list_audit(&session.principal, &query).await?))
}

pub async fn admin_list_applications(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<ApplicationListQuery>,
) -> ApiResult<Envelope<Page<Application>>> {
    Ok(ok(state.admin.list_applications(&session.principal, &query).await?))
}
