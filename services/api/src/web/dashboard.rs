//! services/api/src/web/dashboard.rs

use axum::{extract::State, Json};
use std::sync::Arc;
use studyspark_core::{dashboard, domain::DashboardStats};

use crate::error::HttpResult;
use crate::web::state::AppState;

/// Totals, the five newest summaries and the next five open tasks.
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    responses((status = 200, description = "Dashboard statistics", body = DashboardStats))
)]
pub async fn dashboard_stats(State(state): State<Arc<AppState>>) -> HttpResult<Json<DashboardStats>> {
    let today = dashboard::today();
    Ok(Json(state.storage.get_dashboard_stats(&today).await?))
}
