use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{optional_text, required_text, Path, ValidJson, ValidQuery};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Duration, Utc};
use model::entities::{crop, disease, report, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

const DEFAULT_PER_PAGE: u64 = 20;
const RECENT_DAYS: i64 = 7;
const TOP_CROPS: usize = 5;

/// Request body for creating a report by hand
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateReportRequest {
    pub user_id: i32,
    pub crop_id: i32,
    pub disease_id: Option<i32>,
    pub image_url: String,
    /// Confidence as a fraction between 0 and 1
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence_score: f64,
    /// Defaults to true when no disease is given
    pub is_healthy: Option<bool>,
    pub recommended_treatment: Option<String>,
    pub prevention_tips: Option<String>,
}

/// Request body for updating a report
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateReportRequest {
    /// Marks the diagnosis as verified
    pub is_accurate: Option<bool>,
    pub disease_id: Option<i32>,
    pub recommended_treatment: Option<String>,
    pub prevention_tips: Option<String>,
}

/// Report response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    pub id: i32,
    pub user_id: i32,
    pub crop_id: i32,
    pub disease_id: Option<i32>,
    pub image_url: String,
    /// Fraction between 0 and 1
    pub confidence_score: f64,
    pub is_healthy: bool,
    pub is_accurate: bool,
    pub recommended_treatment: Option<String>,
    pub prevention_tips: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<report::Model> for ReportResponse {
    fn from(model: report::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            crop_id: model.crop_id,
            disease_id: model.disease_id,
            image_url: model.image_url,
            confidence_score: model.confidence_score,
            is_healthy: model.is_healthy,
            is_accurate: model.is_accurate,
            recommended_treatment: model.recommended_treatment,
            prevention_tips: model.prevention_tips,
            submitted_at: model.submitted_at,
        }
    }
}

/// Query parameters for listing reports
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    pub user_id: Option<i32>,
    pub crop_id: Option<i32>,
    pub is_healthy: Option<bool>,
    /// Page number (default: 1)
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    /// Page size (default: 20)
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u64>,
}

/// One page of reports, newest first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportPage {
    pub items: Vec<ReportResponse>,
    pub total: u64,
    pub pages: u64,
    pub page: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CropScanCount {
    pub crop_id: i32,
    pub crop_name: String,
    pub count: u64,
}

/// Scan statistics for one user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportStats {
    pub total_scans: u64,
    pub healthy_count: u64,
    pub diseased_count: u64,
    /// Scans in the last 7 days
    pub recent_scans: u64,
    /// Five most scanned crops
    pub common_crops: Vec<CropScanCount>,
    /// Share of healthy scans, rounded to one decimal
    pub health_percentage: f64,
}

#[derive(Debug, PartialEq)]
struct Tally {
    total: u64,
    healthy: u64,
    recent: u64,
    /// (crop_id, count), most scanned first
    top_crops: Vec<(i32, u64)>,
}

fn tally(reports: &[report::Model], now: DateTime<Utc>) -> Tally {
    let recent_cutoff = now - Duration::days(RECENT_DAYS);
    let mut per_crop: HashMap<i32, u64> = HashMap::new();
    let mut healthy = 0;
    let mut recent = 0;

    for report in reports {
        if report.is_healthy {
            healthy += 1;
        }
        if report.submitted_at >= recent_cutoff {
            recent += 1;
        }
        *per_crop.entry(report.crop_id).or_default() += 1;
    }

    let mut top_crops: Vec<(i32, u64)> = per_crop.into_iter().collect();
    top_crops.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    top_crops.truncate(TOP_CROPS);

    Tally {
        total: reports.len() as u64,
        healthy,
        recent,
        top_crops,
    }
}

fn health_percentage(healthy: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (healthy as f64 / total as f64 * 1000.0).round() / 10.0
}

fn report_not_found(report_id: i32) -> ApiError {
    ApiError::not_found("REPORT_NOT_FOUND", format!("Report with id {} not found", report_id))
}

async fn ensure_disease_exists(state: &AppState, disease_id: i32) -> ApiResult<()> {
    if disease::Entity::find_by_id(disease_id).one(&state.db).await?.is_none() {
        warn!("Disease {} does not exist", disease_id);
        return Err(ApiError::bad_request(
            "INVALID_DISEASE_ID",
            format!("Disease with id {} does not exist", disease_id),
        ));
    }
    Ok(())
}

/// Create a report directly
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created successfully", body = ApiResponse<ReportResponse>),
        (status = 400, description = "Invalid request or unknown reference", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_report(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ReportResponse>>)> {
    trace!("Entering create_report function");
    let image_url = required_text("image_url", &request.image_url)?;

    if user::Entity::find_by_id(request.user_id).one(&state.db).await?.is_none() {
        return Err(ApiError::bad_request(
            "INVALID_USER_ID",
            format!("User with id {} does not exist", request.user_id),
        ));
    }
    if crop::Entity::find_by_id(request.crop_id).one(&state.db).await?.is_none() {
        return Err(ApiError::bad_request(
            "INVALID_CROP_ID",
            format!("Crop with id {} does not exist", request.crop_id),
        ));
    }
    if let Some(disease_id) = request.disease_id {
        ensure_disease_exists(&state, disease_id).await?;
    }

    let new_report = report::ActiveModel {
        user_id: Set(request.user_id),
        crop_id: Set(request.crop_id),
        disease_id: Set(request.disease_id),
        image_url: Set(image_url),
        confidence_score: Set(request.confidence_score),
        is_healthy: Set(request.disease_id.is_none() && request.is_healthy.unwrap_or(true)),
        is_accurate: Set(false),
        recommended_treatment: Set(optional_text(request.recommended_treatment)),
        prevention_tips: Set(optional_text(request.prevention_tips)),
        submitted_at: Set(Utc::now()),
        ..Default::default()
    };

    let report_model = new_report
        .insert(&state.db)
        .await
        .map_err(|e| ApiError::from_write(e, "REPORT_ALREADY_EXISTS", "Report already exists"))?;
    info!("Report created successfully with ID: {}", report_model.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ReportResponse::from(report_model), "Report created successfully")),
    ))
}

/// List reports with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Reports retrieved successfully", body = ApiResponse<ReportPage>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_reports(
    ValidQuery(query): ValidQuery<ReportListQuery>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<ReportPage>>> {
    trace!("Entering get_reports function");
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    debug!("Fetching reports - page: {}, per_page: {}", page, per_page);

    let mut query_builder = report::Entity::find();
    if let Some(user_id) = query.user_id {
        query_builder = query_builder.filter(report::Column::UserId.eq(user_id));
    }
    if let Some(crop_id) = query.crop_id {
        query_builder = query_builder.filter(report::Column::CropId.eq(crop_id));
    }
    if let Some(is_healthy) = query.is_healthy {
        query_builder = query_builder.filter(report::Column::IsHealthy.eq(is_healthy));
    }

    let paginator = query_builder
        .order_by_desc(report::Column::SubmittedAt)
        .order_by_desc(report::Column::Id)
        .paginate(&state.db, per_page);
    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page - 1).await?;
    debug!("Retrieved {} of {} reports", items.len(), totals.number_of_items);

    Ok(Json(ApiResponse::ok(
        ReportPage {
            items: items.into_iter().map(ReportResponse::from).collect(),
            total: totals.number_of_items,
            pages: totals.number_of_pages,
            page,
        },
        "Reports retrieved successfully",
    )))
}

/// Get a specific report by ID
#[utoipa::path(
    get,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(
        ("report_id" = i32, Path, description = "Report ID"),
    ),
    responses(
        (status = 200, description = "Report retrieved successfully", body = ApiResponse<ReportResponse>),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_report(
    Path(report_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<ReportResponse>>> {
    let report_model = report::Entity::find_by_id(report_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| report_not_found(report_id))?;

    Ok(Json(ApiResponse::ok(ReportResponse::from(report_model), "Report retrieved successfully")))
}

/// Update a report
#[utoipa::path(
    put,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(
        ("report_id" = i32, Path, description = "Report ID"),
    ),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Report updated successfully", body = ApiResponse<ReportResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_report(
    Path(report_id): Path<i32>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateReportRequest>,
) -> ApiResult<Json<ApiResponse<ReportResponse>>> {
    let existing = report::Entity::find_by_id(report_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Report with ID {} not found for update", report_id);
            report_not_found(report_id)
        })?;

    let mut active: report::ActiveModel = existing.clone().into();
    if let Some(is_accurate) = request.is_accurate {
        active.is_accurate = Set(is_accurate);
    }
    if let Some(disease_id) = request.disease_id {
        ensure_disease_exists(&state, disease_id).await?;
        active.disease_id = Set(Some(disease_id));
        // A report linked to a disease is never healthy
        active.is_healthy = Set(false);
    }
    if request.recommended_treatment.is_some() {
        active.recommended_treatment = Set(optional_text(request.recommended_treatment));
    }
    if request.prevention_tips.is_some() {
        active.prevention_tips = Set(optional_text(request.prevention_tips));
    }

    let updated = if active.is_changed() {
        active.update(&state.db).await?
    } else {
        existing
    };
    info!("Report with ID {} updated successfully", report_id);

    Ok(Json(ApiResponse::ok(ReportResponse::from(updated), "Report updated successfully")))
}

/// Delete a report
#[utoipa::path(
    delete,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(
        ("report_id" = i32, Path, description = "Report ID"),
    ),
    responses(
        (status = 200, description = "Report deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_report(
    Path(report_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let delete_result = report::Entity::delete_by_id(report_id).exec(&state.db).await?;
    if delete_result.rows_affected == 0 {
        warn!("Report with ID {} not found for deletion", report_id);
        return Err(report_not_found(report_id));
    }

    info!("Report with ID {} deleted successfully", report_id);
    Ok(Json(ApiResponse::ok(
        format!("Report {} deleted", report_id),
        "Report deleted successfully",
    )))
}

/// Scan statistics for the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/reports/stats",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<ReportStats>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_report_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<ReportStats>>> {
    let user_id = auth.0.user_id;
    trace!("Computing report statistics for user {}", user_id);

    let reports = report::Entity::find()
        .filter(report::Column::UserId.eq(user_id))
        .all(&state.db)
        .await?;
    let tally = tally(&reports, Utc::now());

    let crop_ids: Vec<i32> = tally.top_crops.iter().map(|(id, _)| *id).collect();
    let names: HashMap<i32, String> = crop::Entity::find()
        .filter(crop::Column::Id.is_in(crop_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let common_crops = tally
        .top_crops
        .iter()
        .map(|(crop_id, count)| CropScanCount {
            crop_id: *crop_id,
            crop_name: names.get(crop_id).cloned().unwrap_or_default(),
            count: *count,
        })
        .collect();

    let stats = ReportStats {
        total_scans: tally.total,
        healthy_count: tally.healthy,
        diseased_count: tally.total - tally.healthy,
        recent_scans: tally.recent,
        common_crops,
        health_percentage: health_percentage(tally.healthy, tally.total),
    };
    debug!("User {} has {} scans", user_id, stats.total_scans);

    Ok(Json(ApiResponse::ok(stats, "Statistics retrieved successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_at(crop_id: i32, is_healthy: bool, submitted_at: DateTime<Utc>) -> report::Model {
        report::Model {
            id: 0,
            user_id: 1,
            crop_id,
            disease_id: None,
            image_url: String::new(),
            confidence_score: 0.5,
            is_healthy,
            is_accurate: false,
            recommended_treatment: None,
            prevention_tips: None,
            submitted_at,
        }
    }

    #[test]
    fn tally_counts_health_recency_and_crops() {
        let now = Utc::now();
        let old = now - Duration::days(30);
        let reports = vec![
            report_at(2, true, now),
            report_at(2, false, now),
            report_at(1, false, old),
            report_at(3, true, old),
            report_at(2, true, old),
        ];

        let tally = tally(&reports, now);
        assert_eq!(tally.total, 5);
        assert_eq!(tally.healthy, 3);
        assert_eq!(tally.recent, 2);
        assert_eq!(tally.top_crops, vec![(2, 3), (1, 1), (3, 1)]);
    }

    #[test]
    fn tally_keeps_five_crops() {
        let now = Utc::now();
        let reports: Vec<_> = (1..=7).map(|crop| report_at(crop, true, now)).collect();
        assert_eq!(tally(&reports, now).top_crops.len(), 5);
    }

    #[test]
    fn health_percentage_rounds_to_one_decimal() {
        assert_eq!(health_percentage(0, 0), 0.0);
        assert_eq!(health_percentage(1, 3), 33.3);
        assert_eq!(health_percentage(2, 3), 66.7);
        assert_eq!(health_percentage(4, 4), 100.0);
    }
}
