//! Profile handlers.

use axum::extract::{Multipart, Path, State};

use jobboard_models::profile::{ProfileUpdateRequest, RegisterProfileRequest};
use jobboard_models::{Profile, UserId};

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{read_upload, ValidatedJson};
use crate::handlers::path_id;
use crate::response::{ok, Envelope};
use crate::services::profile::SignedUrl;
use crate::state::AppState;

/// Get the caller's profile, creating it on first sight.
pub async fn get_my_profile(State(state): State<AppState>, session: Session) -> ApiResult<Envelope<Profile>> {
    Ok(ok(state.profiles.get_mine(&session.principal).await?))
}

/// Pick the initial role.
pub async fn register_profile(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(req): ValidatedJson<RegisterProfileRequest>,
) -> ApiResult<Envelope<Profile>> {
    Ok(ok(state.profiles.register(&session.principal, req).await?))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(req): ValidatedJson<ProfileUpdateRequest>,
) -> ApiResult<Envelope<Profile>> {
    Ok(ok(state.profiles.update(&session.principal, req).await?))
}

/// Upload a resume as the `file` field of a multipart body.
pub async fn upload_resume(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> ApiResult<Envelope<Profile>> {
    let upload = read_upload(multipart).await?;
    Ok(ok(state.profiles.upload_resume(&session.principal, upload).await?))
}

/// Presigned URL for the caller's own resume.
pub async fn get_my_resume_url(State(state): State<AppState>, session: Session) -> ApiResult<Envelope<SignedUrl>> {
    let caller = session.principal.caller()?.id.clone();
    Ok(ok(state.profiles.resume_url(&session.principal, &caller).await?))
}

/// Presigned URL for another user's resume.
pub async fn get_resume_url(
    State(state): State<AppState>,
    session: Session,
    Path(uid): Path<String>,
) -> ApiResult<Envelope<SignedUrl>> {
    let uid: UserId = path_id(uid)?;
    Ok(ok(state.profiles.resume_url(&session.principal, &uid).await?))
}
