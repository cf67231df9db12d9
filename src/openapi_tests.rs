#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::openapi::{schema::Schema, PathItemType, RefOr};
    use utoipa::OpenApi;

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components should be generated");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{name} should be an object schema"),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        let components = openapi.components.as_ref().unwrap();
        for name in ["ErrorResponse", "HealthResponse", "Analysis", "ReportStats", "ScanResponse"] {
            assert!(components.schemas.contains_key(name), "missing schema {name}");
        }

        // Bearer auth is registered for the protected endpoints
        assert!(components.security_schemes.contains_key("bearer_auth"));

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for field in ["error", "code", "success"] {
            assert!(properties.iter().any(|p| p == field), "ErrorResponse lacks {field}");
        }
    }

    #[test]
    fn test_analysis_schema_structure() {
        let properties = object_properties("Analysis");
        for field in ["plant_name", "is_healthy", "disease", "confidence", "treatment", "prevention", "source"] {
            assert!(properties.iter().any(|p| p == field), "Analysis lacks {field}");
        }
    }

    #[test]
    fn test_openapi_paths_cover_every_resource() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/health",
            "/api/v1/users",
            "/api/v1/crops/{crop_id}",
            "/api/v1/diseases/{disease_id}/treatments",
            "/api/v1/diseases/{disease_id}/treatments/{treatment_id}",
            "/api/v1/treatments",
            "/api/v1/reports",
            "/api/v1/reports/stats",
            "/api/v1/auth/login",
            "/api/v1/auth/reset-password",
            "/api/v1/diagnosis/scan",
            "/api/v1/diagnosis/status",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }

        let scan = paths.get("/api/v1/diagnosis/scan").unwrap();
        let post = scan.operations.get(&PathItemType::Post).expect("scan should be a POST");
        assert!(post.responses.responses.contains_key("201"));
        assert!(post.responses.responses.contains_key("400"));
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
