use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{ComparativeForecast, GroupForecast};
use compute::aggregate::groups_present;
use compute::forecast::{forecast_all_groups, forecast_group};
use tracing::{info, instrument, warn};

use crate::helpers::converters::{convert_comparative, convert_group_forecast};
use crate::helpers::pipeline::{
    ApiError, error_response, load_series, parse_group, resolve_horizon, run_blocking, state_filter,
};
use crate::schemas::{ApiResponse, AppState, ComparativeResponse, ErrorResponse, ForecastQuery, ForecastResponse};

/// Forecast a single population group
///
/// Without a `group` the first group present (Rural, Semi-Urban, Urban) is
/// forecast.
#[utoipa::path(
    get,
    path = "/api/v1/forecast",
    tag = "forecast",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Forecast computed successfully", body = ForecastResponse),
        (status = 400, description = "Invalid horizon or population group", body = ErrorResponse),
        (status = 422, description = "Not enough history to forecast", body = ErrorResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_forecast(
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GroupForecast>>, ApiError> {
    let horizon = resolve_horizon(query.horizon, state.default_horizon)?;
    let requested = parse_group(query.group.as_deref())?;
    let filter = state_filter(query.states.as_deref());

    let series = load_series(&state, &filter).await?;
    let Some(group) = requested.or_else(|| groups_present(&series).first().copied()) else {
        warn!("No data to forecast for {:?}", filter);
        return Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_HISTORY",
            "No data for the selected states",
        ));
    };

    let forecaster = state.forecaster.clone();
    let output = run_blocking(move || forecast_group(forecaster.as_ref(), &series, group, horizon)).await?;
    info!("Forecast for {} ready ({} months)", group, horizon.get());

    Ok(Json(ApiResponse::ok(
        convert_group_forecast(&output),
        "Forecast computed successfully",
    )))
}

/// Forecast every population group present, aligned by month
///
/// Groups with too little history are listed under `skipped`.
#[utoipa::path(
    get,
    path = "/api/v1/forecast/comparative",
    tag = "forecast",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Comparative forecast computed successfully", body = ComparativeResponse),
        (status = 400, description = "Invalid horizon", body = ErrorResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_comparative_forecast(
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ComparativeForecast>>, ApiError> {
    let horizon = resolve_horizon(query.horizon, state.default_horizon)?;
    let filter = state_filter(query.states.as_deref());

    let series = load_series(&state, &filter).await?;
    let forecaster = state.forecaster.clone();
    let comparative = run_blocking(move || forecast_all_groups(forecaster.as_ref(), &series, horizon)).await?;

    let message = if comparative.forecasts.is_empty() {
        "No population group has enough history to forecast"
    } else {
        "Comparative forecast computed successfully"
    };

    Ok(Json(ApiResponse::ok(convert_comparative(&comparative), message)))
}
