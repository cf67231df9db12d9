use crate::error::{ApiError, ApiResult};
use crate::extract::{optional_text, required_text, Path, ValidJson};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::disease;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a disease
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateDiseaseRequest {
    /// Disease name (must be unique)
    pub name: String,
    pub symptoms: Option<String>,
    pub cause: Option<String>,
    /// Detection accuracy as a fraction between 0 and 1
    #[validate(range(min = 0.0, max = 1.0))]
    pub ai_model_accuracy: Option<f64>,
}

/// Request body for updating a disease
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateDiseaseRequest {
    pub name: Option<String>,
    pub symptoms: Option<String>,
    pub cause: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ai_model_accuracy: Option<f64>,
}

/// Disease response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiseaseResponse {
    pub id: i32,
    pub name: String,
    pub symptoms: Option<String>,
    pub cause: Option<String>,
    pub ai_model_accuracy: Option<f64>,
}

impl From<disease::Model> for DiseaseResponse {
    fn from(model: disease::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            symptoms: model.symptoms,
            cause: model.cause,
            ai_model_accuracy: model.ai_model_accuracy,
        }
    }
}

pub(crate) fn disease_not_found(disease_id: i32) -> ApiError {
    ApiError::not_found("DISEASE_NOT_FOUND", format!("Disease with id {} not found", disease_id))
}

fn disease_conflict(err: sea_orm::DbErr) -> ApiError {
    ApiError::from_write(err, "DISEASE_ALREADY_EXISTS", "A disease with this name already exists")
}

pub(crate) async fn find_disease(state: &AppState, disease_id: i32) -> ApiResult<disease::Model> {
    disease::Entity::find_by_id(disease_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| disease_not_found(disease_id))
}

/// Create a new disease
#[utoipa::path(
    post,
    path = "/api/v1/diseases",
    tag = "diseases",
    request_body = CreateDiseaseRequest,
    responses(
        (status = 201, description = "Disease created successfully", body = ApiResponse<DiseaseResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Disease already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_disease(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateDiseaseRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<DiseaseResponse>>)> {
    trace!("Entering create_disease function");

    let new_disease = disease::ActiveModel {
        name: Set(required_text("name", &request.name)?),
        symptoms: Set(optional_text(request.symptoms)),
        cause: Set(optional_text(request.cause)),
        ai_model_accuracy: Set(request.ai_model_accuracy),
        ..Default::default()
    };

    let disease_model = new_disease.insert(&state.db).await.map_err(disease_conflict)?;
    info!("Disease created successfully with ID: {}, name: {}", disease_model.id, disease_model.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(DiseaseResponse::from(disease_model), "Disease created successfully")),
    ))
}

/// Get all diseases
#[utoipa::path(
    get,
    path = "/api/v1/diseases",
    tag = "diseases",
    responses(
        (status = 200, description = "Diseases retrieved successfully", body = ApiResponse<Vec<DiseaseResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_diseases(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<DiseaseResponse>>>> {
    let diseases = disease::Entity::find()
        .order_by_asc(disease::Column::Name)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} diseases from database", diseases.len());

    Ok(Json(ApiResponse::ok(
        diseases.into_iter().map(DiseaseResponse::from).collect(),
        "Diseases retrieved successfully",
    )))
}

/// Get a specific disease by ID
#[utoipa::path(
    get,
    path = "/api/v1/diseases/{disease_id}",
    tag = "diseases",
    params(
        ("disease_id" = i32, Path, description = "Disease ID"),
    ),
    responses(
        (status = 200, description = "Disease retrieved successfully", body = ApiResponse<DiseaseResponse>),
        (status = 404, description = "Disease not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_disease(
    Path(disease_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<DiseaseResponse>>> {
    let disease_model = find_disease(&state, disease_id).await?;
    Ok(Json(ApiResponse::ok(DiseaseResponse::from(disease_model), "Disease retrieved successfully")))
}

/// Update a disease
#[utoipa::path(
    put,
    path = "/api/v1/diseases/{disease_id}",
    tag = "diseases",
    params(
        ("disease_id" = i32, Path, description = "Disease ID"),
    ),
    request_body = UpdateDiseaseRequest,
    responses(
        (status = 200, description = "Disease updated successfully", body = ApiResponse<DiseaseResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Disease not found", body = ErrorResponse),
        (status = 409, description = "Disease already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_disease(
    Path(disease_id): Path<i32>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateDiseaseRequest>,
) -> ApiResult<Json<ApiResponse<DiseaseResponse>>> {
    trace!("Entering update_disease function for disease_id: {}", disease_id);

    let existing = find_disease(&state, disease_id).await.inspect_err(|_| {
        warn!("Disease with ID {} not found for update", disease_id);
    })?;

    let mut active: disease::ActiveModel = existing.clone().into();
    if let Some(name) = request.name {
        active.name = Set(required_text("name", &name)?);
    }
    if request.symptoms.is_some() {
        active.symptoms = Set(optional_text(request.symptoms));
    }
    if request.cause.is_some() {
        active.cause = Set(optional_text(request.cause));
    }
    if let Some(accuracy) = request.ai_model_accuracy {
        active.ai_model_accuracy = Set(Some(accuracy));
    }

    let updated = if active.is_changed() {
        active.update(&state.db).await.map_err(disease_conflict)?
    } else {
        existing
    };
    info!("Disease with ID {} updated successfully", disease_id);

    Ok(Json(ApiResponse::ok(DiseaseResponse::from(updated), "Disease updated successfully")))
}

/// Delete a disease. Reports keep their rows with the disease cleared.
#[utoipa::path(
    delete,
    path = "/api/v1/diseases/{disease_id}",
    tag = "diseases",
    params(
        ("disease_id" = i32, Path, description = "Disease ID"),
    ),
    responses(
        (status = 200, description = "Disease deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Disease not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_disease(
    Path(disease_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let delete_result = disease::Entity::delete_by_id(disease_id).exec(&state.db).await?;
    if delete_result.rows_affected == 0 {
        warn!("Disease with ID {} not found for deletion", disease_id);
        return Err(disease_not_found(disease_id));
    }

    info!("Disease with ID {} deleted successfully", disease_id);
    Ok(Json(ApiResponse::ok(
        format!("Disease {} deleted", disease_id),
        "Disease deleted successfully",
    )))
}
