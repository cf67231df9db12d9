use common::{Analysis, AnalysisSource, Confidence, DiseaseKind, PlantDetails, SimilarImage};
use diagnosis::{Notifier, PlantIdentifier};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::config::Settings;
use crate::handlers::{
    auth::{
        AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
        UpdateProfileRequest,
    },
    crops::{CreateCropRequest, CropResponse, UpdateCropRequest},
    diagnosis::{DiagnosisStatusResponse, ScanResponse, ScanUpload},
    disease_treatments::{LinkTreatmentRequest, RankedTreatmentResponse},
    diseases::{CreateDiseaseRequest, DiseaseResponse, UpdateDiseaseRequest},
    reports::{
        CreateReportRequest, CropScanCount, ReportPage, ReportResponse, ReportStats,
        UpdateReportRequest,
    },
    treatments::{CreateTreatmentRequest, TreatmentResponse, UpdateTreatmentRequest},
    users::{CreateUserRequest, UpdateUserRequest, UserResponse},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Password reset token to user id, expiring after the configured TTL
    pub reset_tokens: Cache<String, i32>,
    pub settings: Arc<Settings>,
    /// Plant identification backend
    pub identifier: Arc<dyn PlantIdentifier>,
    /// Outbound email
    pub notifier: Arc<dyn Notifier>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
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
#[derive(Serialize, Deserialize, ToSchema)]
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

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::crops::create_crop,
        crate::handlers::crops::get_crops,
        crate::handlers::crops::get_crop,
        crate::handlers::crops::update_crop,
        crate::handlers::crops::delete_crop,
        crate::handlers::diseases::create_disease,
        crate::handlers::diseases::get_diseases,
        crate::handlers::diseases::get_disease,
        crate::handlers::diseases::update_disease,
        crate::handlers::diseases::delete_disease,
        crate::handlers::disease_treatments::get_disease_treatments,
        crate::handlers::disease_treatments::link_treatment,
        crate::handlers::disease_treatments::unlink_treatment,
        crate::handlers::treatments::create_treatment,
        crate::handlers::treatments::get_treatments,
        crate::handlers::treatments::get_treatment,
        crate::handlers::treatments::update_treatment,
        crate::handlers::treatments::delete_treatment,
        crate::handlers::reports::create_report,
        crate::handlers::reports::get_reports,
        crate::handlers::reports::get_report,
        crate::handlers::reports::update_report,
        crate::handlers::reports::delete_report,
        crate::handlers::reports::get_report_stats,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::get_profile,
        crate::handlers::auth::update_profile,
        crate::handlers::auth::forgot_password,
        crate::handlers::auth::reset_password,
        crate::handlers::diagnosis::scan_image,
        crate::handlers::diagnosis::diagnosis_status,
    ),
    components(
        schemas(
            ApiResponse<UserResponse>,
            ApiResponse<ReportPage>,
            ApiResponse<ScanResponse>,
            ErrorResponse,
            HealthResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            CreateCropRequest,
            UpdateCropRequest,
            CropResponse,
            CreateDiseaseRequest,
            UpdateDiseaseRequest,
            DiseaseResponse,
            CreateTreatmentRequest,
            UpdateTreatmentRequest,
            TreatmentResponse,
            LinkTreatmentRequest,
            RankedTreatmentResponse,
            CreateReportRequest,
            UpdateReportRequest,
            ReportResponse,
            ReportPage,
            ReportStats,
            CropScanCount,
            RegisterRequest,
            LoginRequest,
            UpdateProfileRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            AuthResponse,
            ScanUpload,
            ScanResponse,
            DiagnosisStatusResponse,
            Analysis,
            AnalysisSource,
            Confidence,
            DiseaseKind,
            PlantDetails,
            SimilarImage,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management"),
        (name = "crops", description = "Crop catalogue"),
        (name = "diseases", description = "Disease catalogue and ranked treatments"),
        (name = "treatments", description = "Treatment catalogue"),
        (name = "reports", description = "Scan reports and statistics"),
        (name = "auth", description = "Registration, login and password reset"),
        (name = "diagnosis", description = "Image based crop diagnosis"),
    ),
    info(
        title = "AgriSmart API",
        description = "Crop disease detection and reporting API",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
