use axum::{extract::State, response::Json};
use tracing::{info, instrument};

use crate::schemas::{ApiResponse, AppState, RefreshResponse, RefreshSummary};

/// Drop every cached record selection and dashboard pass
///
/// The next request reads the store again.
#[utoipa::path(
    post,
    path = "/api/v1/cache/refresh",
    tag = "cache",
    responses(
        (status = 200, description = "Caches cleared", body = RefreshResponse)
    )
)]
#[instrument(skip(state))]
pub async fn refresh_cache(State(state): State<AppState>) -> Json<ApiResponse<RefreshSummary>> {
    let record_entries = state.records.cache_size() as u64;
    let dashboard_entries = state.cache.entry_count();

    state.records.clear_cache();
    state.cache.invalidate_all();
    state.cache.run_pending_tasks().await;
    info!(record_entries, dashboard_entries, "Caches refreshed");

    Json(ApiResponse::ok(
        RefreshSummary {
            record_entries,
            dashboard_entries,
        },
        "Caches cleared",
    ))
}
