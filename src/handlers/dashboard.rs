use axum::{
    extract::{Query, State},
    response::Json,
};
use axum_valid::Valid;
use common::DashboardView;
use compute::dashboard::DashboardParams;
use tracing::{debug, instrument};

use crate::helpers::converters::convert_dashboard;
use crate::helpers::pipeline::{ApiError, dashboard_for, parse_group, resolve_horizon, state_filter};
use crate::schemas::{ApiResponse, AppState, DashboardResponse, ErrorResponse, ForecastQuery};

/// Recompute the whole dashboard: trends, KPIs, forecast and comparison
///
/// A forecast that cannot be computed is reported inline with status
/// `unavailable`; the historical part is still returned.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Dashboard computed successfully", body = DashboardResponse),
        (status = 400, description = "Invalid horizon or population group", body = ErrorResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_dashboard(
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardView>>, ApiError> {
    let params = DashboardParams::new(
        state_filter(query.states.as_deref()),
        resolve_horizon(query.horizon, state.default_horizon)?,
        parse_group(query.group.as_deref())?,
    );

    let dashboard = dashboard_for(&state, params).await?;
    debug!("Dashboard has {} merged rows", dashboard.rows.len());

    Ok(Json(ApiResponse::ok(
        convert_dashboard(&dashboard),
        "Dashboard computed successfully",
    )))
}
