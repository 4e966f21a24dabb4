#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();

        for schema in ["ErrorResponse", "HealthResponse", "DashboardView", "DashboardResponse", "ForecastSection"] {
            assert!(components.schemas.contains_key(schema), "missing schema {}", schema);
        }

        let json_result = serde_json::to_string(&openapi);
        assert!(json_result.is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let error_response_schema = components.schemas.get("ErrorResponse").unwrap();

        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = error_response_schema {
            let properties = &obj.properties;
            assert!(properties.contains_key("error"));
            assert!(properties.contains_key("code"));
            assert!(properties.contains_key("success"));
        } else {
            panic!("ErrorResponse should be an object schema");
        }
    }

    #[test]
    fn test_openapi_paths() {
        let openapi = ApiDoc::openapi();

        for path in [
            "/health",
            "/api/v1/states",
            "/api/v1/trends",
            "/api/v1/forecast",
            "/api/v1/forecast/comparative",
            "/api/v1/dashboard",
            "/api/v1/export.csv",
            "/api/v1/insights",
            "/api/v1/cache/refresh",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }

        let refresh = openapi.paths.paths.get("/api/v1/cache/refresh").unwrap();
        assert!(refresh.operations.contains_key(&utoipa::openapi::PathItemType::Post));
    }

    #[test]
    fn test_forecast_documents_error_statuses() {
        let openapi = ApiDoc::openapi();
        let forecast = openapi.paths.paths.get("/api/v1/forecast").unwrap();
        let get = forecast
            .operations
            .get(&utoipa::openapi::PathItemType::Get)
            .unwrap();

        for status in ["200", "400", "422", "503", "500"] {
            assert!(get.responses.responses.contains_key(status), "missing status {}", status);
        }
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi = ApiDoc::openapi();
        let openapi_json = serde_json::to_string(&openapi).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("ErrorResponse"));
    }
}
