use crate::handlers::{
    auth::{forgot_password, get_profile, login, register, reset_password, update_profile},
    crops::{create_crop, delete_crop, get_crop, get_crops, update_crop},
    diagnosis::{diagnosis_status, scan_image},
    disease_treatments::{get_disease_treatments, link_treatment, unlink_treatment},
    diseases::{create_disease, delete_disease, get_disease, get_diseases, update_disease},
    health::health_check,
    reports::{create_report, delete_report, get_report, get_report_stats, get_reports, update_report},
    treatments::{create_treatment, delete_treatment, get_treatment, get_treatments, update_treatment},
    users::{create_user, delete_user, get_user, get_users, update_user},
};
use crate::error::route_not_found;
use crate::schemas::{ApiDoc, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
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
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.settings.upload.max_request_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", post(create_user).get(get_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Crop CRUD routes
        .route("/api/v1/crops", post(create_crop).get(get_crops))
        .route(
            "/api/v1/crops/:crop_id",
            get(get_crop).put(update_crop).delete(delete_crop),
        )
        // Disease CRUD and ranked treatment links
        .route("/api/v1/diseases", post(create_disease).get(get_diseases))
        .route(
            "/api/v1/diseases/:disease_id",
            get(get_disease).put(update_disease).delete(delete_disease),
        )
        .route(
            "/api/v1/diseases/:disease_id/treatments",
            get(get_disease_treatments).post(link_treatment),
        )
        .route(
            "/api/v1/diseases/:disease_id/treatments/:treatment_id",
            delete(unlink_treatment),
        )
        // Treatment CRUD routes
        .route("/api/v1/treatments", post(create_treatment).get(get_treatments))
        .route(
            "/api/v1/treatments/:treatment_id",
            get(get_treatment).put(update_treatment).delete(delete_treatment),
        )
        // Reports
        .route("/api/v1/reports", post(create_report).get(get_reports))
        .route("/api/v1/reports/stats", get(get_report_stats))
        .route(
            "/api/v1/reports/:report_id",
            get(get_report).put(update_report).delete(delete_report),
        )
        // Authentication
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/profile", get(get_profile).put(update_profile))
        .route("/api/v1/auth/forgot-password", post(forgot_password))
        .route("/api/v1/auth/reset-password", post(reset_password))
        // Diagnosis
        .route("/api/v1/diagnosis/scan", post(scan_image))
        .route("/api/v1/diagnosis/status", get(diagnosis_status))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        // Add middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
