use crate::auth::hash_password;
use crate::error::{ApiError, ApiResult};
use crate::extract::{optional_text, required_text, Path, ValidJson};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::user;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Username (must be unique)
    pub username: String,
    /// Email address (must be unique)
    #[validate(email)]
    pub email: String,
    /// Plain text password, at least 6 characters
    #[validate(length(min = 6))]
    pub password: String,
    pub phone_number: Option<String>,
    pub county: Option<String>,
    pub farm_name: Option<String>,
    /// Farm size in hectares
    #[validate(range(min = 0.0))]
    pub farm_size: Option<f64>,
    pub is_extension_agent: Option<bool>,
}

/// Request body for updating a user
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub county: Option<String>,
    pub farm_name: Option<String>,
    #[validate(range(min = 0.0))]
    pub farm_size: Option<f64>,
    pub is_extension_agent: Option<bool>,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub county: Option<String>,
    pub farm_name: Option<String>,
    pub farm_size: Option<f64>,
    pub is_extension_agent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            phone_number: model.phone_number,
            county: model.county,
            farm_name: model.farm_name,
            farm_size: model.farm_size,
            is_extension_agent: model.is_extension_agent,
            created_at: model.created_at,
        }
    }
}

pub(crate) fn user_conflict(err: sea_orm::DbErr) -> ApiError {
    ApiError::from_write(err, "USER_ALREADY_EXISTS", "Username or email already exists")
}

pub(crate) async fn find_user(state: &AppState, user_id: i32) -> ApiResult<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("User with ID {} not found", user_id);
            ApiError::not_found("USER_NOT_FOUND", format!("User with id {} not found", user_id))
        })
}

/// Applies the optional profile fields shared by user and profile updates.
pub(crate) async fn apply_user_changes(
    state: &AppState,
    active: &mut user::ActiveModel,
    request: UpdateUserRequest,
) -> ApiResult<Vec<&'static str>> {
    let mut updated_fields = Vec::new();

    if let Some(username) = request.username {
        active.username = Set(required_text("username", &username)?);
        updated_fields.push("username");
    }
    if let Some(email) = request.email {
        active.email = Set(email.trim().to_lowercase());
        updated_fields.push("email");
    }
    if let Some(password) = request.password {
        active.password_hash = Set(hash_password(password, state.settings.auth.bcrypt_cost).await?);
        updated_fields.push("password");
    }
    if request.phone_number.is_some() {
        active.phone_number = Set(optional_text(request.phone_number));
        updated_fields.push("phone_number");
    }
    if request.county.is_some() {
        active.county = Set(optional_text(request.county));
        updated_fields.push("county");
    }
    if request.farm_name.is_some() {
        active.farm_name = Set(optional_text(request.farm_name));
        updated_fields.push("farm_name");
    }
    if let Some(farm_size) = request.farm_size {
        active.farm_size = Set(Some(farm_size));
        updated_fields.push("farm_size");
    }
    if let Some(is_agent) = request.is_extension_agent {
        active.is_extension_agent = Set(is_agent);
        updated_fields.push("is_extension_agent");
    }

    Ok(updated_fields)
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    trace!("Entering create_user function");
    let username = required_text("username", &request.username)?;
    debug!("Creating user with username: {}", username);

    let password_hash = hash_password(request.password, state.settings.auth.bcrypt_cost).await?;
    let new_user = user::ActiveModel {
        username: Set(username),
        email: Set(request.email.trim().to_lowercase()),
        password_hash: Set(password_hash),
        phone_number: Set(optional_text(request.phone_number)),
        county: Set(optional_text(request.county)),
        farm_name: Set(optional_text(request.farm_name)),
        farm_size: Set(request.farm_size),
        is_extension_agent: Set(request.is_extension_agent.unwrap_or(false)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    trace!("Attempting to insert new user into database");
    let user_model = new_user.insert(&state.db).await.map_err(user_conflict)?;
    info!("User created successfully with ID: {}, username: {}", user_model.id, user_model.username);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(user_model), "User created successfully")),
    ))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    trace!("Entering get_users function");

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} users from database", users.len());

    let user_responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(user_responses, "Users retrieved successfully")))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering get_user function for user_id: {}", user_id);
    let user_model = find_user(&state, user_id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user_model), "User retrieved successfully")))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_user function for user_id: {}", user_id);

    let existing_user = find_user(&state, user_id).await?;
    let mut user_active: user::ActiveModel = existing_user.clone().into();
    let updated_fields = apply_user_changes(&state, &mut user_active, request).await?;

    if updated_fields.is_empty() {
        debug!("No fields to update for user ID: {}", user_id);
        return Ok(Json(ApiResponse::ok(UserResponse::from(existing_user), "User updated successfully")));
    }

    debug!("Updating fields: {}", updated_fields.join(", "));
    let updated_user = user_active.update(&state.db).await.map_err(user_conflict)?;
    info!("User with ID {} updated successfully. Updated fields: {}", user_id, updated_fields.join(", "));

    Ok(Json(ApiResponse::ok(UserResponse::from(updated_user), "User updated successfully")))
}

/// Delete a user and their reports
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<String>>> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    let delete_result = user::Entity::delete_by_id(user_id).exec(&state.db).await?;
    debug!("Delete operation completed. Rows affected: {}", delete_result.rows_affected);
    if delete_result.rows_affected == 0 {
        warn!("User with ID {} not found for deletion", user_id);
        return Err(ApiError::not_found("USER_NOT_FOUND", format!("User with id {} not found", user_id)));
    }

    info!("User with ID {} deleted successfully", user_id);
    Ok(Json(ApiResponse::ok(format!("User {} deleted", user_id), "User deleted successfully")))
}
