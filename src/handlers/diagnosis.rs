//! Image upload, analysis and report persistence.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::disease_treatments::{ranked_treatments, RankedTreatmentResponse};
use crate::handlers::users::find_user;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use common::Analysis;
use diagnosis::notify::templates;
use diagnosis::upload::{self, StoredImage};
use diagnosis::{fallback, UploadError};
use model::entities::{crop, disease, report};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

/// Multipart form accepted by the scan endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ScanUpload {
    /// PNG, JPG or WebP image, at most 10 MB
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
    /// Pins the report to an existing crop
    crop_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanResponse {
    pub analysis: Analysis,
    pub report_id: i32,
    /// Treatments linked to the detected disease, best first
    pub ranked_treatments: Vec<RankedTreatmentResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisStatusResponse {
    pub plant_id_configured: bool,
    pub email_configured: bool,
    /// Number of canned results used when identification fails
    pub fallback_outcomes: usize,
}

#[derive(Debug, Default)]
struct ScanForm {
    image: Option<(String, Bytes)>,
    crop_id: Option<i32>,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<ScanForm> {
    let mut form = ScanForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.image = Some((file_name, bytes));
            }
            Some("crop_id") => {
                let text = field.text().await?;
                let text = text.trim();
                if !text.is_empty() {
                    let crop_id = text
                        .parse()
                        .map_err(|_| ApiError::validation("crop_id must be an integer"))?;
                    form.crop_id = Some(crop_id);
                }
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

/// Crop whose name matches case-insensitively, created when missing.
async fn crop_for_plant<C: ConnectionTrait>(db: &C, plant_name: &str) -> Result<i32, DbErr> {
    let existing = crop::Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(crop::Column::Name))).eq(plant_name.to_lowercase()))
        .one(db)
        .await?;
    if let Some(found) = existing {
        return Ok(found.id);
    }

    let created = crop::ActiveModel {
        name: Set(plant_name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created crop {} for scanned plant", created.id);
    Ok(created.id)
}

async fn persist_report<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    crop_id: Option<i32>,
    image: &StoredImage,
    analysis: &Analysis,
) -> Result<report::Model, DbErr> {
    let crop_id = match crop_id {
        Some(id) => id,
        None => crop_for_plant(db, &analysis.plant_name).await?,
    };

    let disease_id = match (&analysis.disease, analysis.is_healthy) {
        (Some(label), false) => disease::Entity::find()
            .filter(disease::Column::Name.eq(label.as_str()))
            .one(db)
            .await?
            .map(|d| d.id),
        _ => None,
    };

    report::ActiveModel {
        user_id: Set(user_id),
        crop_id: Set(crop_id),
        disease_id: Set(disease_id),
        image_url: Set(image.path.display().to_string()),
        confidence_score: Set(analysis.confidence.fraction()),
        is_healthy: Set(analysis.is_healthy),
        is_accurate: Set(false),
        recommended_treatment: Set(Some(analysis.treatment.clone())),
        prevention_tips: Set(Some(analysis.prevention.clone())),
        submitted_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Ranked treatments for a stored report. The report is already committed
/// at this point, so a failed lookup is logged and yields an empty list.
async fn treatments_for_report<C: ConnectionTrait>(
    db: &C,
    report_id: i32,
    disease_id: Option<i32>,
) -> Vec<RankedTreatmentResponse> {
    let Some(disease_id) = disease_id else {
        return Vec::new();
    };
    ranked_treatments(db, disease_id).await.unwrap_or_else(|e| {
        warn!("Failed to rank treatments for report {}: {}", report_id, e);
        Vec::new()
    })
}

/// Analyse a crop image and record a report
#[utoipa::path(
    post,
    path = "/api/v1/diagnosis/scan",
    tag = "diagnosis",
    security(("bearer_auth" = [])),
    request_body(content = ScanUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Analysis complete", body = ApiResponse<ScanResponse>),
        (status = 400, description = "Missing, unsupported or oversize image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth, multipart), fields(user_id = auth.0.user_id))]
pub async fn scan_image(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ScanResponse>>)> {
    let form = read_form(multipart?).await?;
    let (file_name, bytes) = form.image.ok_or(UploadError::MissingImage)?;
    upload::validate(&file_name, bytes.len(), state.settings.upload.max_image_bytes)?;

    let user_model = find_user(&state, auth.0.user_id).await?;
    if let Some(crop_id) = form.crop_id {
        if crop::Entity::find_by_id(crop_id).one(&state.db).await?.is_none() {
            return Err(ApiError::bad_request(
                "INVALID_CROP_ID",
                format!("Crop with id {} does not exist", crop_id),
            ));
        }
    }

    let stored = upload::store(&state.settings.upload.dir, &file_name, &bytes).await?;
    let analysis = diagnosis::analyze(state.identifier.as_ref(), &bytes).await;
    debug!("Analysis for {}: {}", stored.file_name, analysis.status_message());

    let txn = state.db.begin().await?;
    let persisted = persist_report(&txn, user_model.id, form.crop_id, &stored, &analysis).await;
    let committed = match persisted {
        Ok(saved) => txn.commit().await.map(|_| saved),
        Err(e) => Err(e),
    };
    let saved = match committed {
        Ok(saved) => saved,
        Err(e) => {
            upload::remove(&stored).await;
            return Err(e.into());
        }
    };
    info!("Saved report {} for user {}", saved.id, user_model.id);

    let message = templates::disease_report(&state.settings.email, &user_model.email, &user_model.username, &analysis);
    if let Err(e) = state.notifier.send(&message).await {
        warn!("Failed to send report email for report {}: {}", saved.id, e);
    }

    let ranked = treatments_for_report(&state.db, saved.id, saved.disease_id).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ScanResponse {
                analysis,
                report_id: saved.id,
                ranked_treatments: ranked,
            },
            "Analysis complete",
        )),
    ))
}

/// Which external integrations are configured
#[utoipa::path(
    get,
    path = "/api/v1/diagnosis/status",
    tag = "diagnosis",
    responses(
        (status = 200, description = "Diagnosis status retrieved", body = ApiResponse<DiagnosisStatusResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn diagnosis_status(State(state): State<AppState>) -> Json<ApiResponse<DiagnosisStatusResponse>> {
    Json(ApiResponse::ok(
        DiagnosisStatusResponse {
            plant_id_configured: state.identifier.is_configured(),
            email_configured: state.notifier.is_configured(),
            fallback_outcomes: fallback::OUTCOME_COUNT,
        },
        "Diagnosis status retrieved",
    ))
}
