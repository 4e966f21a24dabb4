use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_valid::Valid;
use compute::dashboard::DashboardParams;
use compute::present::{self, merge_views};
use tracing::{info, instrument};

use crate::helpers::pipeline::{
    ApiError, compute_error_response, dashboard_for, load_series, parse_group, resolve_horizon, state_filter,
};
use crate::schemas::{AppState, ErrorResponse, ExportQuery};

/// File name offered to the browser.
pub const EXPORT_FILE_NAME: &str = "wla_trends_data.csv";

/// Download the merged historical and forecast table as CSV
#[utoipa::path(
    get,
    path = "/api/v1/export.csv",
    tag = "export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 400, description = "Invalid horizon or population group", body = ErrorResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn export_csv(
    Valid(Query(query)): Valid<Query<ExportQuery>>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = state_filter(query.states.as_deref());

    let rows = if query.include_forecast.unwrap_or(true) {
        let params = DashboardParams::new(
            filter,
            resolve_horizon(query.horizon, state.default_horizon)?,
            parse_group(query.group.as_deref())?,
        );
        dashboard_for(&state, params).await?.rows.clone()
    } else {
        let series = load_series(&state, &filter).await?;
        merge_views(&series, &[])
    };

    let csv = present::export_csv(&rows).map_err(|e| compute_error_response(&e))?;
    info!("Exported {} rows as CSV", rows.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        csv,
    ))
}
