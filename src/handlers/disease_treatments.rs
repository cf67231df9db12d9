//! Ranked treatments attached to a disease.

use crate::error::{ApiError, ApiResult};
use crate::extract::{Path, ValidJson};
use crate::handlers::diseases::find_disease;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::{disease_treatment, treatment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for linking a treatment to a disease
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LinkTreatmentRequest {
    pub treatment_id: i32,
    /// 1 is the preferred treatment; defaults to 1
    #[validate(range(min = 1))]
    pub priority_rank: Option<i32>,
}

/// Treatment with its rank for one disease
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RankedTreatmentResponse {
    pub treatment_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub organic_status: bool,
    pub cost_estimate: Option<String>,
    pub priority_rank: i32,
}

impl RankedTreatmentResponse {
    fn new(link: &disease_treatment::Model, treatment: treatment::Model) -> Self {
        Self {
            treatment_id: treatment.id,
            name: treatment.name,
            description: treatment.description,
            organic_status: treatment.organic_status,
            cost_estimate: treatment.cost_estimate,
            priority_rank: link.priority_rank,
        }
    }
}

/// Treatments of a disease, best rank first, ties by treatment id.
pub async fn ranked_treatments<C: ConnectionTrait>(
    db: &C,
    disease_id: i32,
) -> Result<Vec<RankedTreatmentResponse>, DbErr> {
    let rows = disease_treatment::Entity::find()
        .filter(disease_treatment::Column::DiseaseId.eq(disease_id))
        .order_by_asc(disease_treatment::Column::PriorityRank)
        .order_by_asc(disease_treatment::Column::TreatmentId)
        .find_also_related(treatment::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(link, treatment)| treatment.map(|t| RankedTreatmentResponse::new(&link, t)))
        .collect())
}

/// List the ranked treatments of a disease
#[utoipa::path(
    get,
    path = "/api/v1/diseases/{disease_id}/treatments",
    tag = "diseases",
    params(
        ("disease_id" = i32, Path, description = "Disease ID"),
    ),
    responses(
        (status = 200, description = "Treatments retrieved successfully", body = ApiResponse<Vec<RankedTreatmentResponse>>),
        (status = 404, description = "Disease not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_disease_treatments(
    Path(disease_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<RankedTreatmentResponse>>>> {
    find_disease(&state, disease_id).await?;

    let ranked = ranked_treatments(&state.db, disease_id).await?;
    debug!("Disease {} has {} linked treatments", disease_id, ranked.len());
    Ok(Json(ApiResponse::ok(ranked, "Treatments retrieved successfully")))
}

/// Link a treatment to a disease
#[utoipa::path(
    post,
    path = "/api/v1/diseases/{disease_id}/treatments",
    tag = "diseases",
    params(
        ("disease_id" = i32, Path, description = "Disease ID"),
    ),
    request_body = LinkTreatmentRequest,
    responses(
        (status = 201, description = "Treatment linked successfully", body = ApiResponse<RankedTreatmentResponse>),
        (status = 400, description = "Invalid request or unknown treatment", body = ErrorResponse),
        (status = 404, description = "Disease not found", body = ErrorResponse),
        (status = 409, description = "Treatment already linked", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn link_treatment(
    Path(disease_id): Path<i32>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LinkTreatmentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RankedTreatmentResponse>>)> {
    find_disease(&state, disease_id).await?;

    let treatment_model = treatment::Entity::find_by_id(request.treatment_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Treatment {} does not exist", request.treatment_id);
            ApiError::bad_request(
                "INVALID_TREATMENT_ID",
                format!("Treatment with id {} does not exist", request.treatment_id),
            )
        })?;

    let existing = disease_treatment::Entity::find_by_id((disease_id, request.treatment_id))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "LINK_ALREADY_EXISTS",
            format!(
                "Treatment {} is already linked to disease {}",
                request.treatment_id, disease_id
            ),
        ));
    }

    let link = disease_treatment::ActiveModel {
        disease_id: Set(disease_id),
        treatment_id: Set(request.treatment_id),
        priority_rank: Set(request.priority_rank.unwrap_or(1)),
    }
    .insert(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, "LINK_ALREADY_EXISTS", "Treatment is already linked to this disease"))?;

    info!(
        "Linked treatment {} to disease {} with rank {}",
        link.treatment_id, link.disease_id, link.priority_rank
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            RankedTreatmentResponse::new(&link, treatment_model),
            "Treatment linked successfully",
        )),
    ))
}

/// Remove a treatment from a disease
#[utoipa::path(
    delete,
    path = "/api/v1/diseases/{disease_id}/treatments/{treatment_id}",
    tag = "diseases",
    params(
        ("disease_id" = i32, Path, description = "Disease ID"),
        ("treatment_id" = i32, Path, description = "Treatment ID"),
    ),
    responses(
        (status = 200, description = "Treatment unlinked successfully", body = ApiResponse<String>),
        (status = 404, description = "Link not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unlink_treatment(
    Path((disease_id, treatment_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let result = disease_treatment::Entity::delete_by_id((disease_id, treatment_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        warn!("No link between disease {} and treatment {}", disease_id, treatment_id);
        return Err(ApiError::not_found(
            "LINK_NOT_FOUND",
            format!("Treatment {} is not linked to disease {}", treatment_id, disease_id),
        ));
    }

    info!("Unlinked treatment {} from disease {}", treatment_id, disease_id);
    Ok(Json(ApiResponse::ok(
        format!("Treatment {} unlinked from disease {}", treatment_id, disease_id),
        "Treatment unlinked successfully",
    )))
}
