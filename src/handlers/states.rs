use axum::{extract::State, response::Json};
use compute::loader::list_states;
use tracing::{info, instrument};

use crate::helpers::pipeline::{ApiError, compute_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, StatesResponse};

/// List the states present in the store
#[utoipa::path(
    get,
    path = "/api/v1/states",
    tag = "trends",
    responses(
        (status = 200, description = "States retrieved successfully", body = StatesResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_states(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let states = list_states(&state.db)
        .await
        .map_err(|e| compute_error_response(&e))?;
    info!("Listed {} states", states.len());

    Ok(Json(ApiResponse::ok(states, "States retrieved successfully")))
}
