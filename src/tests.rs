#[cfg(test)]
mod integration_tests {
    use crate::schemas::{ErrorResponse, HealthResponse, RefreshSummary};
    use crate::test_utils::test_utils::{setup_test_app, setup_test_app_state, setup_test_app_with_state};
    use crate::router::create_router;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::NaiveDate;
    // Responses are read back through the client-side wrapper
    use common::{
        ApiResponse, ComparativeForecast, DashboardView, ForecastSection, GroupForecast, HistoricalInsights, PopulationGroup,
        TrendSeries,
    };
    use sea_orm::Database;

    async fn server() -> TestServer {
        TestServer::new(setup_test_app().await).unwrap()
    }

    fn first_of(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "connected");
    }

    #[tokio::test]
    async fn test_metrics_endpoint_disabled_in_tests() {
        let server = server().await;

        // The Prometheus recorder is global and only installed outside of tests
        let response = server.get("/metrics").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_states() {
        let server = server().await;

        let response = server.get("/api/v1/states").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<String>> = response.json();
        assert!(body.success);
        assert_eq!(body.data, vec!["Goa".to_string(), "Kerala".to_string()]);
    }

    #[tokio::test]
    async fn test_get_trends_all_states() {
        let server = server().await;

        let response = server.get("/api/v1/trends").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<TrendSeries> = response.json();
        let trends = body.data;
        assert_eq!(
            trends.groups,
            vec![PopulationGroup::Rural, PopulationGroup::SemiUrban, PopulationGroup::Urban]
        );
        // 14 Urban + 6 Rural + 1 Semi-Urban buckets
        assert_eq!(trends.points.len(), 21);

        // February 2023 Urban averages Kerala (53) and Goa (60)
        let feb_urban = trends
            .for_group(PopulationGroup::Urban)
            .find(|p| p.month == first_of(2023, 2))
            .unwrap();
        assert!((feb_urban.value - 56.5).abs() < 1e-9);

        // Ordered by month, then group
        assert!(
            trends
                .points
                .windows(2)
                .all(|w| (w[0].month, w[0].population_group) < (w[1].month, w[1].population_group))
        );
    }

    #[tokio::test]
    async fn test_get_trends_filtered_states() {
        let server = server().await;

        let response = server.get("/api/v1/trends").add_query_param("states", "goa").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<TrendSeries> = response.json();
        assert_eq!(body.data.states, vec!["Goa".to_string()]);
        assert_eq!(body.data.points.len(), 2);
    }

    #[tokio::test]
    async fn test_get_trends_unknown_state_is_empty() {
        let server = server().await;

        let response = server.get("/api/v1/trends").add_query_param("states", "Atlantis").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<TrendSeries> = response.json();
        assert!(body.data.is_empty());
        assert_eq!(body.message, "No data for the selected states");
    }

    #[tokio::test]
    async fn test_get_forecast() {
        let server = server().await;

        let response = server
            .get("/api/v1/forecast")
            .add_query_param("states", "Kerala")
            .add_query_param("group", "urban")
            .add_query_param("horizon", 6)
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<GroupForecast> = response.json();
        let forecast = body.data;
        assert_eq!(forecast.population_group, PopulationGroup::Urban);
        assert_eq!(forecast.horizon, 6);
        assert_eq!(forecast.last_historical_month, first_of(2023, 2));
        assert_eq!(forecast.points.len(), 14 + 6);
        assert_eq!(forecast.future_points().count(), 6);
        assert_eq!(forecast.latest().unwrap().month, first_of(2023, 8));
        assert!(forecast.points.iter().all(|p| p.predicted.is_finite()));
    }

    #[tokio::test]
    async fn test_get_forecast_defaults_to_first_group() {
        let server = server().await;

        let response = server.get("/api/v1/forecast").add_query_param("states", "Kerala").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<GroupForecast> = response.json();
        assert_eq!(body.data.population_group, PopulationGroup::Rural);
        assert_eq!(body.data.horizon, 12);
        assert_eq!(body.data.future_points().count(), 12);
    }

    #[tokio::test]
    async fn test_get_forecast_insufficient_history() {
        let server = server().await;

        let response = server.get("/api/v1/forecast").add_query_param("group", "s-urban").await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INSUFFICIENT_HISTORY");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_get_forecast_rejects_horizon_out_of_range() {
        let server = server().await;

        for horizon in [2, 37] {
            let response = server.get("/api/v1/forecast").add_query_param("horizon", horizon).await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_get_forecast_rejects_unknown_group() {
        let server = server().await;

        let response = server.get("/api/v1/forecast").add_query_param("group", "metro").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_GROUP");
    }

    #[tokio::test]
    async fn test_get_comparative_forecast() {
        let server = server().await;

        let response = server
            .get("/api/v1/forecast/comparative")
            .add_query_param("horizon", 3)
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<ComparativeForecast> = response.json();
        let comparative = body.data;

        let groups: Vec<PopulationGroup> = comparative.series.iter().map(|s| s.population_group).collect();
        assert_eq!(groups, vec![PopulationGroup::Rural, PopulationGroup::Urban]);
        assert!(comparative.series.iter().all(|s| s.future_points().count() == 3));

        assert_eq!(comparative.skipped.len(), 1);
        assert_eq!(comparative.skipped[0].population_group, PopulationGroup::SemiUrban);

        // January 2022 through May 2023
        assert_eq!(comparative.months.len(), 17);
        assert!(comparative.months.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_get_dashboard() {
        let server = server().await;

        let response = server
            .get("/api/v1/dashboard")
            .add_query_param("states", "Kerala")
            .add_query_param("horizon", 3)
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<DashboardView> = response.json();
        let view = body.data;

        assert_eq!(view.horizon, 3);
        assert_eq!(view.trends.points.len(), 20);

        let peak = view.kpis.peak.unwrap();
        assert_eq!(peak.value, 53.0);
        assert_eq!(peak.month, first_of(2023, 2));

        let forecast = view.forecast.forecast().unwrap();
        assert_eq!(forecast.population_group, PopulationGroup::Rural);
        let latest = view.kpis.latest_forecast.unwrap();
        assert_eq!(latest.month, first_of(2023, 5));
        assert_eq!(latest.population_group, PopulationGroup::Rural);

        assert_eq!(view.comparative.series.len(), 2);
    }

    #[tokio::test]
    async fn test_get_dashboard_forecast_unavailable_inline() {
        let server = server().await;

        let response = server
            .get("/api/v1/dashboard")
            .add_query_param("group", "Semi-Urban")
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["forecast"]["status"], "unavailable");
        assert_eq!(body.data["forecast"]["population_group"], "s-urban");

        let view: DashboardView = serde_json::from_value(body.data).unwrap();
        assert!(matches!(view.forecast, ForecastSection::Unavailable { .. }));
        assert!(!view.trends.is_empty());
        assert!(view.kpis.latest_forecast.is_none());
    }

    #[tokio::test]
    async fn test_export_csv() {
        let server = server().await;

        let response = server
            .get("/api/v1/export.csv")
            .add_query_param("states", "Kerala")
            .add_query_param("group", "urban")
            .add_query_param("horizon", 4)
            .await;

        response.assert_status(StatusCode::OK);
        assert!(
            response
                .header("content-type")
                .to_str()
                .unwrap()
                .starts_with("text/csv")
        );
        assert!(
            response
                .header("content-disposition")
                .to_str()
                .unwrap()
                .contains("wla_trends_data.csv")
        );

        let text = response.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "month,population_group,kind,value,lower_bound,upper_bound");
        assert_eq!(lines[1], "2022-01-01,Urban,historical,40,,");
        assert_eq!(lines.iter().filter(|l| l.contains(",forecast,")).count(), 4);
        assert_eq!(lines.len(), 1 + 20 + 4);
    }

    #[tokio::test]
    async fn test_export_csv_without_forecast() {
        let server = server().await;

        let response = server
            .get("/api/v1/export.csv")
            .add_query_param("include_forecast", false)
            .await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert_eq!(text.lines().count(), 1 + 21);
        assert!(!text.contains(",forecast,"));
    }

    #[tokio::test]
    async fn test_export_csv_empty_selection_is_header_only() {
        let server = server().await;

        let response = server
            .get("/api/v1/export.csv")
            .add_query_param("states", "Atlantis")
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.text(),
            "month,population_group,kind,value,lower_bound,upper_bound\n"
        );
    }

    #[tokio::test]
    async fn test_get_insights() {
        let server = server().await;

        let response = server.get("/api/v1/insights").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Option<HistoricalInsights>> = response.json();
        let insights = body.data.unwrap();

        assert_eq!(insights.total_records, 22);
        assert_eq!(insights.first_month, first_of(2022, 1));
        assert_eq!(insights.last_month, first_of(2023, 2));
        assert_eq!(insights.peak.state, "Goa");
        assert_eq!(insights.peak.value, 60.0);
        assert_eq!(insights.groups.len(), 3);
        assert_eq!(insights.top_states[0].state, "Goa");
        assert_eq!(insights.most_improved_state.unwrap().state, "Kerala");
    }

    #[tokio::test]
    async fn test_get_insights_without_data() {
        let server = server().await;

        let response = server.get("/api/v1/insights").add_query_param("states", "Atlantis").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Option<HistoricalInsights>> = response.json();
        assert!(body.data.is_none());
    }

    #[tokio::test]
    async fn test_cache_refresh() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();

        server.get("/api/v1/trends").await.assert_status(StatusCode::OK);
        server
            .get("/api/v1/trends")
            .add_query_param("states", "Goa")
            .await
            .assert_status(StatusCode::OK);
        assert_eq!(state.records.cache_size(), 2);

        let response = server.post("/api/v1/cache/refresh").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<RefreshSummary> = response.json();
        assert_eq!(body.data.record_entries, 2);
        assert_eq!(state.records.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_service_unavailable() {
        let mut state = setup_test_app_state().await;
        // No migrations: every query fails
        state.db = Database::connect("sqlite::memory:").await.unwrap();
        let server = TestServer::new(create_router(state)).unwrap();

        for path in ["/api/v1/trends", "/api/v1/dashboard", "/api/v1/states"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
            let body: ErrorResponse = response.json();
            assert_eq!(body.code, "DATA_UNAVAILABLE");
        }
    }
}
