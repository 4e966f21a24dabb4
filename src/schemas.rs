use common::{
    ComparativeForecast, DashboardView, ForecastPoint, ForecastSection, GroupForecast, GroupStatistics,
    HistoricalInsights, KpiSummary, LatestForecast, PeakRecord, PeakValue, PopulationGroup, SkippedGroup,
    StateGrowth, StateStatistics, TrendPoint, TrendSeries,
};
use compute::dashboard::Dashboard;
use compute::forecast::Forecaster;
use compute::loader::DatabaseRecordSource;
use compute::loader::cache::CachedRecordSource;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache of whole dashboard passes, keyed by the parameter tuple
    pub cache: Cache<String, CachedData>,
    /// Record loader, memoized per state selection
    pub records: Arc<CachedRecordSource<DatabaseRecordSource>>,
    /// Model used for every forecast
    pub forecaster: Arc<dyn Forecaster>,
    /// Horizon used when a request does not name one
    pub default_horizon: u32,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Dashboard(Arc<Dashboard>),
}

/// Query parameters selecting states
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct StatesQuery {
    /// Comma-separated state names; all states when empty
    pub states: Option<String>,
}

/// Query parameters for forecast endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ForecastQuery {
    /// Comma-separated state names; all states when empty
    pub states: Option<String>,
    /// Population group to forecast (rural, s-urban, urban)
    pub group: Option<String>,
    /// Number of months to forecast (3-36)
    #[validate(range(min = 3, max = 36))]
    pub horizon: Option<u32>,
}

/// Query parameters for the CSV export
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ExportQuery {
    /// Comma-separated state names; all states when empty
    pub states: Option<String>,
    /// Population group whose forecast is appended
    pub group: Option<String>,
    /// Number of months to forecast (3-36)
    #[validate(range(min = 3, max = 36))]
    pub horizon: Option<u32>,
    /// Append forecast rows (default: true)
    pub include_forecast: Option<bool>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
#[aliases(
    StatesResponse = ApiResponse<Vec<String>>,
    TrendsResponse = ApiResponse<TrendSeries>,
    ForecastResponse = ApiResponse<GroupForecast>,
    ComparativeResponse = ApiResponse<ComparativeForecast>,
    DashboardResponse = ApiResponse<DashboardView>,
    InsightsResponse = ApiResponse<Option<HistoricalInsights>>,
    RefreshResponse = ApiResponse<RefreshSummary>,
)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// What a cache refresh dropped
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshSummary {
    /// Cached record selections dropped
    pub record_entries: u64,
    /// Cached dashboard passes dropped
    pub dashboard_entries: u64,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::states::get_states,
        crate::handlers::trends::get_trends,
        crate::handlers::forecast::get_forecast,
        crate::handlers::forecast::get_comparative_forecast,
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::export::export_csv,
        crate::handlers::insights::get_insights,
        crate::handlers::cache::refresh_cache,
    ),
    components(
        schemas(
            StatesResponse,
            TrendsResponse,
            ForecastResponse,
            ComparativeResponse,
            DashboardResponse,
            InsightsResponse,
            RefreshResponse,
            ErrorResponse,
            HealthResponse,
            RefreshSummary,
            StatesQuery,
            ForecastQuery,
            ExportQuery,
            PopulationGroup,
            TrendPoint,
            TrendSeries,
            ForecastPoint,
            GroupForecast,
            SkippedGroup,
            ComparativeForecast,
            PeakValue,
            LatestForecast,
            KpiSummary,
            ForecastSection,
            DashboardView,
            PeakRecord,
            GroupStatistics,
            StateStatistics,
            StateGrowth,
            HistoricalInsights,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "trends", description = "Historical WLA trends"),
        (name = "forecast", description = "WLA forecasts per population group"),
        (name = "dashboard", description = "Full dashboard recomputation"),
        (name = "export", description = "CSV export"),
        (name = "insights", description = "Historical insights report"),
        (name = "cache", description = "Cache management"),
    ),
    info(
        title = "wlacast API",
        description = "WLA (Workload Assessment) trends, KPIs and forecasts per state and population group",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
