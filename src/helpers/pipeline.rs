//! Plumbing shared by the handlers: query parsing, error mapping and running
//! the compute pipeline off the async runtime.

use axum::{http::StatusCode, response::Json};
use common::PopulationGroup;
use compute::aggregate::aggregate;
use compute::dashboard::{Dashboard, DashboardParams, build_dashboard};
use compute::error::ComputeError;
use compute::forecast::Horizon;
use compute::loader::RecordSource;
use compute::types::{AggregatedSeries, Record, StateFilter};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

use crate::schemas::{AppState, CachedData, ErrorResponse};

/// Error half of every JSON handler's result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Maps a pipeline error to its HTTP status and error code.
pub fn compute_error_response(err: &ComputeError) -> ApiError {
    match err {
        ComputeError::DataUnavailable(_) => {
            error!("Data unavailable: {}", err);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "DATA_UNAVAILABLE", err.to_string())
        }
        ComputeError::InvalidHorizon(_) => {
            warn!("Rejected horizon: {}", err);
            error_response(StatusCode::BAD_REQUEST, "INVALID_HORIZON", err.to_string())
        }
        ComputeError::InsufficientHistory { .. } => {
            warn!("Forecast rejected: {}", err);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_HISTORY", err.to_string())
        }
        _ => {
            error!("Computation failed: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "COMPUTE_ERROR", err.to_string())
        }
    }
}

pub fn state_filter(states: Option<&str>) -> StateFilter {
    states.map(StateFilter::parse_list).unwrap_or_default()
}

pub fn parse_group(group: Option<&str>) -> Result<Option<PopulationGroup>, ApiError> {
    match group.map(str::trim).filter(|g| !g.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse::<PopulationGroup>().map(Some).map_err(|e| {
            warn!("Rejected population group: {}", e);
            error_response(StatusCode::BAD_REQUEST, "INVALID_GROUP", e.to_string())
        }),
    }
}

pub fn resolve_horizon(requested: Option<u32>, default: u32) -> Result<Horizon, ApiError> {
    Horizon::new(requested.unwrap_or(default)).map_err(|e| compute_error_response(&e))
}

pub async fn load_records(state: &AppState, filter: &StateFilter) -> Result<Vec<Record>, ApiError> {
    state
        .records
        .load_records(&state.db, filter)
        .await
        .map_err(|e| compute_error_response(&e))
}

pub async fn load_series(state: &AppState, filter: &StateFilter) -> Result<AggregatedSeries, ApiError> {
    let records = load_records(state, filter).await?;
    aggregate(&records).map_err(|e| compute_error_response(&e))
}

/// Runs CPU-bound pipeline work on the blocking thread pool.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> compute::error::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(|e| compute_error_response(&e)),
        Err(e) => {
            error!("Blocking task failed: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Computation task failed",
            ))
        }
    }
}

/// One dashboard pass, served from the view cache when the same parameters
/// were computed before.
pub async fn dashboard_for(state: &AppState, params: DashboardParams) -> Result<Arc<Dashboard>, ApiError> {
    let cache_key = format!("dashboard_{:?}", params);

    if let Some(CachedData::Dashboard(dashboard)) = state.cache.get(&cache_key).await {
        trace!("Dashboard cache hit for {}", cache_key);
        return Ok(dashboard);
    }

    let records = load_records(state, &params.filter).await?;
    let forecaster = state.forecaster.clone();
    let dashboard = run_blocking(move || build_dashboard(forecaster.as_ref(), &records, &params)).await?;
    let dashboard = Arc::new(dashboard);

    state
        .cache
        .insert(cache_key, CachedData::Dashboard(dashboard.clone()))
        .await;
    debug!("Dashboard computed and cached");

    Ok(dashboard)
}
