use axum::{
    extract::{Query, State},
    response::Json,
};
use common::TrendSeries;
use tracing::{debug, instrument};

use crate::helpers::converters::convert_trend_series;
use crate::helpers::pipeline::{ApiError, load_series, state_filter};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, StatesQuery, TrendsResponse};

/// Monthly WLA averages per population group for the selected states
#[utoipa::path(
    get,
    path = "/api/v1/trends",
    tag = "trends",
    params(StatesQuery),
    responses(
        (status = 200, description = "Trends retrieved successfully", body = TrendsResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_trends(
    Query(query): Query<StatesQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TrendSeries>>, ApiError> {
    let filter = state_filter(query.states.as_deref());
    let series = load_series(&state, &filter).await?;
    debug!("Trend series has {} points", series.len());

    let message = if series.is_empty() {
        "No data for the selected states"
    } else {
        "Trends retrieved successfully"
    };

    Ok(Json(ApiResponse::ok(convert_trend_series(&filter, &series), message)))
}
