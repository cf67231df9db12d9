use crate::error::{ApiError, ApiResult};
use crate::extract::{optional_text, required_text, Path, ValidJson};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::crop;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a crop
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCropRequest {
    /// Crop name (must be unique)
    #[validate(length(max = 100))]
    pub name: String,
    pub scientific_name: Option<String>,
    pub base_region: Option<String>,
    /// Comma separated local names
    pub common_names: Option<String>,
}

/// Request body for updating a crop
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCropRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub scientific_name: Option<String>,
    pub base_region: Option<String>,
    pub common_names: Option<String>,
}

/// Crop response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CropResponse {
    pub id: i32,
    pub name: String,
    pub scientific_name: Option<String>,
    pub base_region: Option<String>,
    pub common_names: Option<String>,
}

impl From<crop::Model> for CropResponse {
    fn from(model: crop::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            scientific_name: model.scientific_name,
            base_region: model.base_region,
            common_names: model.common_names,
        }
    }
}

fn crop_not_found(crop_id: i32) -> ApiError {
    ApiError::not_found("CROP_NOT_FOUND", format!("Crop with id {} not found", crop_id))
}

fn crop_conflict(err: sea_orm::DbErr) -> ApiError {
    ApiError::from_write(err, "CROP_ALREADY_EXISTS", "A crop with this name already exists")
}

/// Create a new crop
#[utoipa::path(
    post,
    path = "/api/v1/crops",
    tag = "crops",
    request_body = CreateCropRequest,
    responses(
        (status = 201, description = "Crop created successfully", body = ApiResponse<CropResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Crop already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_crop(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateCropRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CropResponse>>)> {
    trace!("Entering create_crop function");
    let name = required_text("name", &request.name)?;

    let new_crop = crop::ActiveModel {
        name: Set(name),
        scientific_name: Set(optional_text(request.scientific_name)),
        base_region: Set(optional_text(request.base_region)),
        common_names: Set(optional_text(request.common_names)),
        ..Default::default()
    };

    let crop_model = new_crop.insert(&state.db).await.map_err(crop_conflict)?;
    info!("Crop created successfully with ID: {}, name: {}", crop_model.id, crop_model.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CropResponse::from(crop_model), "Crop created successfully")),
    ))
}

/// Get all crops
#[utoipa::path(
    get,
    path = "/api/v1/crops",
    tag = "crops",
    responses(
        (status = 200, description = "Crops retrieved successfully", body = ApiResponse<Vec<CropResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_crops(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<CropResponse>>>> {
    let crops = crop::Entity::find()
        .order_by_asc(crop::Column::Name)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} crops from database", crops.len());

    Ok(Json(ApiResponse::ok(
        crops.into_iter().map(CropResponse::from).collect(),
        "Crops retrieved successfully",
    )))
}

/// Get a specific crop by ID
#[utoipa::path(
    get,
    path = "/api/v1/crops/{crop_id}",
    tag = "crops",
    params(
        ("crop_id" = i32, Path, description = "Crop ID"),
    ),
    responses(
        (status = 200, description = "Crop retrieved successfully", body = ApiResponse<CropResponse>),
        (status = 404, description = "Crop not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_crop(
    Path(crop_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<CropResponse>>> {
    let crop_model = crop::Entity::find_by_id(crop_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| crop_not_found(crop_id))?;

    Ok(Json(ApiResponse::ok(CropResponse::from(crop_model), "Crop retrieved successfully")))
}

/// Update a crop
#[utoipa::path(
    put,
    path = "/api/v1/crops/{crop_id}",
    tag = "crops",
    params(
        ("crop_id" = i32, Path, description = "Crop ID"),
    ),
    request_body = UpdateCropRequest,
    responses(
        (status = 200, description = "Crop updated successfully", body = ApiResponse<CropResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Crop not found", body = ErrorResponse),
        (status = 409, description = "Crop already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_crop(
    Path(crop_id): Path<i32>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateCropRequest>,
) -> ApiResult<Json<ApiResponse<CropResponse>>> {
    trace!("Entering update_crop function for crop_id: {}", crop_id);

    let existing = crop::Entity::find_by_id(crop_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Crop with ID {} not found for update", crop_id);
            crop_not_found(crop_id)
        })?;

    let mut active: crop::ActiveModel = existing.clone().into();
    if let Some(name) = request.name {
        active.name = Set(required_text("name", &name)?);
    }
    if request.scientific_name.is_some() {
        active.scientific_name = Set(optional_text(request.scientific_name));
    }
    if request.base_region.is_some() {
        active.base_region = Set(optional_text(request.base_region));
    }
    if request.common_names.is_some() {
        active.common_names = Set(optional_text(request.common_names));
    }

    let updated = if active.is_changed() {
        active.update(&state.db).await.map_err(crop_conflict)?
    } else {
        debug!("No fields to update for crop ID: {}", crop_id);
        existing
    };
    info!("Crop with ID {} updated successfully", crop_id);

    Ok(Json(ApiResponse::ok(CropResponse::from(updated), "Crop updated successfully")))
}

/// Delete a crop and its reports
#[utoipa::path(
    delete,
    path = "/api/v1/crops/{crop_id}",
    tag = "crops",
    params(
        ("crop_id" = i32, Path, description = "Crop ID"),
    ),
    responses(
        (status = 200, description = "Crop deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Crop not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_crop(
    Path(crop_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let delete_result = crop::Entity::delete_by_id(crop_id).exec(&state.db).await?;
    if delete_result.rows_affected == 0 {
        warn!("Crop with ID {} not found for deletion", crop_id);
        return Err(crop_not_found(crop_id));
    }

    info!("Crop with ID {} deleted successfully", crop_id);
    Ok(Json(ApiResponse::ok(format!("Crop {} deleted", crop_id), "Crop deleted successfully")))
}
