use crate::error::{ApiError, ApiResult};
use crate::extract::{optional_text, required_text, Path, ValidJson};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::treatment;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a treatment
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTreatmentRequest {
    /// Treatment name (must be unique)
    pub name: String,
    pub description: Option<String>,
    /// Whether the treatment is suitable for organic farming
    pub organic_status: Option<bool>,
    /// Free text cost estimate, e.g. "KES 800-1200 per litre"
    #[validate(length(max = 100))]
    pub cost_estimate: Option<String>,
}

/// Request body for updating a treatment
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTreatmentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub organic_status: Option<bool>,
    #[validate(length(max = 100))]
    pub cost_estimate: Option<String>,
}

/// Treatment response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TreatmentResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub organic_status: bool,
    pub cost_estimate: Option<String>,
}

impl From<treatment::Model> for TreatmentResponse {
    fn from(model: treatment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            organic_status: model.organic_status,
            cost_estimate: model.cost_estimate,
        }
    }
}

pub(crate) fn treatment_not_found(treatment_id: i32) -> ApiError {
    ApiError::not_found(
        "TREATMENT_NOT_FOUND",
        format!("Treatment with id {} not found", treatment_id),
    )
}

fn treatment_conflict(err: sea_orm::DbErr) -> ApiError {
    ApiError::from_write(err, "TREATMENT_ALREADY_EXISTS", "A treatment with this name already exists")
}

/// Create a new treatment
#[utoipa::path(
    post,
    path = "/api/v1/treatments",
    tag = "treatments",
    request_body = CreateTreatmentRequest,
    responses(
        (status = 201, description = "Treatment created successfully", body = ApiResponse<TreatmentResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Treatment already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_treatment(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateTreatmentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TreatmentResponse>>)> {
    trace!("Entering create_treatment function");

    let new_treatment = treatment::ActiveModel {
        name: Set(required_text("name", &request.name)?),
        description: Set(optional_text(request.description)),
        organic_status: Set(request.organic_status.unwrap_or(false)),
        cost_estimate: Set(optional_text(request.cost_estimate)),
        ..Default::default()
    };

    let treatment_model = new_treatment.insert(&state.db).await.map_err(treatment_conflict)?;
    info!(
        "Treatment created successfully with ID: {}, name: {}",
        treatment_model.id, treatment_model.name
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(TreatmentResponse::from(treatment_model), "Treatment created successfully")),
    ))
}

/// Get all treatments
#[utoipa::path(
    get,
    path = "/api/v1/treatments",
    tag = "treatments",
    responses(
        (status = 200, description = "Treatments retrieved successfully", body = ApiResponse<Vec<TreatmentResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_treatments(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<TreatmentResponse>>>> {
    let treatments = treatment::Entity::find()
        .order_by_asc(treatment::Column::Name)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} treatments from database", treatments.len());

    Ok(Json(ApiResponse::ok(
        treatments.into_iter().map(TreatmentResponse::from).collect(),
        "Treatments retrieved successfully",
    )))
}

/// Get a specific treatment by ID
#[utoipa::path(
    get,
    path = "/api/v1/treatments/{treatment_id}",
    tag = "treatments",
    params(
        ("treatment_id" = i32, Path, description = "Treatment ID"),
    ),
    responses(
        (status = 200, description = "Treatment retrieved successfully", body = ApiResponse<TreatmentResponse>),
        (status = 404, description = "Treatment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_treatment(
    Path(treatment_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<TreatmentResponse>>> {
    let treatment_model = treatment::Entity::find_by_id(treatment_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| treatment_not_found(treatment_id))?;

    Ok(Json(ApiResponse::ok(
        TreatmentResponse::from(treatment_model),
        "Treatment retrieved successfully",
    )))
}

/// Update a treatment
#[utoipa::path(
    put,
    path = "/api/v1/treatments/{treatment_id}",
    tag = "treatments",
    params(
        ("treatment_id" = i32, Path, description = "Treatment ID"),
    ),
    request_body = UpdateTreatmentRequest,
    responses(
        (status = 200, description = "Treatment updated successfully", body = ApiResponse<TreatmentResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Treatment not found", body = ErrorResponse),
        (status = 409, description = "Treatment already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_treatment(
    Path(treatment_id): Path<i32>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateTreatmentRequest>,
) -> ApiResult<Json<ApiResponse<TreatmentResponse>>> {
    let existing = treatment::Entity::find_by_id(treatment_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Treatment with ID {} not found for update", treatment_id);
            treatment_not_found(treatment_id)
        })?;

    let mut active: treatment::ActiveModel = existing.clone().into();
    if let Some(name) = request.name {
        active.name = Set(required_text("name", &name)?);
    }
    if request.description.is_some() {
        active.description = Set(optional_text(request.description));
    }
    if let Some(organic) = request.organic_status {
        active.organic_status = Set(organic);
    }
    if request.cost_estimate.is_some() {
        active.cost_estimate = Set(optional_text(request.cost_estimate));
    }

    let updated = if active.is_changed() {
        active.update(&state.db).await.map_err(treatment_conflict)?
    } else {
        existing
    };
    info!("Treatment with ID {} updated successfully", treatment_id);

    Ok(Json(ApiResponse::ok(TreatmentResponse::from(updated), "Treatment updated successfully")))
}

/// Delete a treatment and its disease links
#[utoipa::path(
    delete,
    path = "/api/v1/treatments/{treatment_id}",
    tag = "treatments",
    params(
        ("treatment_id" = i32, Path, description = "Treatment ID"),
    ),
    responses(
        (status = 200, description = "Treatment deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Treatment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_treatment(
    Path(treatment_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let delete_result = treatment::Entity::delete_by_id(treatment_id).exec(&state.db).await?;
    if delete_result.rows_affected == 0 {
        warn!("Treatment with ID {} not found for deletion", treatment_id);
        return Err(treatment_not_found(treatment_id));
    }

    info!("Treatment with ID {} deleted successfully", treatment_id);
    Ok(Json(ApiResponse::ok(
        format!("Treatment {} deleted", treatment_id),
        "Treatment deleted successfully",
    )))
}
