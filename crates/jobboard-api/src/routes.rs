//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::ApiError;
use crate::handlers::admin::{
    admin_archive_job, admin_list_applications, admin_list_companies, admin_list_jobs, approve_job, get_user,
    list_audit_log, list_users, reject_company, reject_job, set_user_active, set_user_role, verify_company,
};
use crate::handlers::applications::{
    apply, get_application, list_job_applications, list_my_applications, update_application_notes,
    update_application_status, withdraw_application,
};
use crate::handlers::companies::{
    create_company, delete_company, get_company, get_company_logo_url, get_my_company, list_companies,
    list_company_jobs, update_company, upload_company_logo,
};
use crate::handlers::export::export_data;
use crate::handlers::jobs::{archive_job, close_job, create_job, delete_job, get_job, list_jobs, submit_job, update_job};
use crate::handlers::profile::{
    get_my_profile, get_my_resume_url, get_resume_url, register_profile, update_my_profile, upload_resume,
};
use crate::handlers::references::list_references;
use crate::handlers::stats::{company_stats, dashboard_stats};
use crate::handlers::{health, ready};
use crate::i18n::Message;
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, localize_errors, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let profile_routes = Router::new()
        .route("/profile", get(get_my_profile).patch(update_my_profile))
        .route("/profile/register", post(register_profile))
        .route("/profile/resume", post(upload_resume))
        .route("/profile/resume-url", get(get_my_resume_url))
        .route("/users/:uid/resume-url", get(get_resume_url));

    let company_routes = Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/mine", get(get_my_company))
        .route("/companies/mine/stats", get(company_stats))
        .route(
            "/companies/:id",
            get(get_company).patch(update_company).delete(delete_company),
        )
        .route("/companies/:id/logo", post(upload_company_logo))
        .route("/companies/:id/logo-url", get(get_company_logo_url))
        .route("/companies/:id/jobs", get(list_company_jobs).post(create_job));

    let job_routes = Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job).patch(update_job).delete(delete_job))
        .route("/jobs/:id/submit", post(submit_job))
        .route("/jobs/:id/close", post(close_job))
        .route("/jobs/:id/archive", post(archive_job))
        .route("/jobs/:id/applications", get(list_job_applications).post(apply));

    let application_routes = Router::new()
        .route("/applications/mine", get(list_my_applications))
        .route("/applications/:id", get(get_application))
        .route("/applications/:id/status", patch(update_application_status))
        .route("/applications/:id/notes", patch(update_application_notes))
        .route("/applications/:id/withdraw", post(withdraw_application));

    let admin_routes = Router::new()
        // Moderation
        .route("/admin/jobs", get(admin_list_jobs))
        .route("/admin/jobs/:id/approve", post(approve_job))
        .route("/admin/jobs/:id/reject", post(reject_job))
        .route("/admin/jobs/:id/archive", post(admin_archive_job))
        .route("/admin/companies", get(admin_list_companies))
        .route("/admin/companies/:id/verify", post(verify_company))
        .route("/admin/companies/:id/reject", post(reject_company))
        // User management
        .route("/admin/users", get(list_users))
        .route("/admin/users/:uid", get(get_user))
        .route("/admin/users/:uid/role", patch(set_user_role))
        .route("/admin/users/:uid/active", patch(set_user_active))
        // Reporting
        .route("/admin/audit", get(list_audit_log))
        .route("/admin/applications", get(admin_list_applications))
        .route("/admin/stats", get(dashboard_stats))
        .route("/admin/export/:entity", get(export_data));

    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(profile_routes)
        .merge(company_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(admin_routes)
        .route("/references/:kind", get(list_references))
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .fallback(|| async { ApiError::NotFound(Message::RouteNotFound) })
        // Body size is enforced by the tower layer so uploads share one limit
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(localize_errors))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
