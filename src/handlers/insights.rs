use axum::{
    extract::{Query, State},
    response::Json,
};
use common::HistoricalInsights;
use compute::insights::compute_insights;
use tracing::instrument;

use crate::helpers::converters::convert_insights;
use crate::helpers::pipeline::{ApiError, load_records, run_blocking, state_filter};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, InsightsResponse, StatesQuery};

/// Historical insights report for the selected states
#[utoipa::path(
    get,
    path = "/api/v1/insights",
    tag = "insights",
    params(StatesQuery),
    responses(
        (status = 200, description = "Insights computed successfully; data is null without records", body = InsightsResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_insights(
    Query(query): Query<StatesQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Option<HistoricalInsights>>>, ApiError> {
    let filter = state_filter(query.states.as_deref());
    let records = load_records(&state, &filter).await?;
    let insights = run_blocking(move || compute_insights(&records)).await?;

    let response = match insights {
        Some(insights) => ApiResponse::ok(Some(convert_insights(&insights)), "Insights computed successfully"),
        None => ApiResponse::ok(None, "No data for the selected states"),
    };

    Ok(Json(response))
}
