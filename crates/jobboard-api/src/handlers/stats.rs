//! Dashboard statistics handlers.

use axum::extract::State;

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::QueryParams;
use crate::response::{ok, Envelope};
use crate::services::stats::{CompanyStats, DashboardStats, StatsQuery};
use crate::state::AppState;

pub async fn dashboard_stats(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<StatsQuery>,
) -> ApiResult<Envelope<DashboardStats>> {
    Ok(ok(state.stats.dashboard(&session.principal, &query).await?))
}

pub async fn company_stats(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Envelope<CompanyStats>> {
    Ok(ok(state.stats.company_stats(&session.principal).await?))
}
