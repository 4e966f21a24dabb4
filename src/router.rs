use crate::handlers::{
    cache::refresh_cache,
    dashboard::get_dashboard,
    export::export_csv,
    forecast::{get_comparative_forecast, get_forecast},
    health::health_check,
    insights::get_insights,
    states::get_states,
    trends::get_trends,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
///
/// Outside of tests a Prometheus recorder is installed and served on
/// `/metrics`; the recorder is global, so this may only run once per process.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Historical data
        .route("/api/v1/states", get(get_states))
        .route("/api/v1/trends", get(get_trends))
        .route("/api/v1/insights", get(get_insights))
        // Forecasts
        .route("/api/v1/forecast", get(get_forecast))
        .route("/api/v1/forecast/comparative", get(get_comparative_forecast))
        .route("/api/v1/dashboard", get(get_dashboard))
        // Export
        .route("/api/v1/export.csv", get(export_csv))
        // Cache management
        .route("/api/v1/cache/refresh", post(refresh_cache))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
