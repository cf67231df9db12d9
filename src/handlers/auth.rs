//! Registration, login, profile and password reset.

use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::{optional_text, required_text, ValidJson};
use crate::handlers::users::{apply_user_changes, find_user, user_conflict, UpdateUserRequest, UserResponse};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use diagnosis::notify::templates;
use diagnosis::EmailMessage;
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// At least 6 characters
    #[validate(length(min = 6))]
    pub password: String,
    pub phone_number: Option<String>,
    pub county: Option<String>,
    pub farm_name: Option<String>,
    #[validate(range(min = 0.0))]
    pub farm_size: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile fields a user may change on their own account
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
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
}

impl From<UpdateProfileRequest> for UpdateUserRequest {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password: request.password,
            phone_number: request.phone_number,
            county: request.county,
            farm_name: request.farm_name,
            farm_size: request.farm_size,
            is_extension_agent: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Signed token together with the account it belongs to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token (HS256 JWT)
    pub token: String,
    pub user: UserResponse,
}

async fn send_best_effort(state: &AppState, message: EmailMessage) {
    if let Err(e) = state.notifier.send(&message).await {
        warn!("Failed to send '{}' email to {}: {}", message.subject, message.to, e);
    }
}

async fn find_by_email(state: &AppState, email: &str) -> ApiResult<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(&state.db)
        .await?)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let username = required_text("username", &request.username)?;
    debug!("Registering user {}", username);

    let password_hash = hash_password(request.password, state.settings.auth.bcrypt_cost).await?;
    let new_user = user::ActiveModel {
        username: Set(username),
        email: Set(request.email.trim().to_lowercase()),
        password_hash: Set(password_hash),
        phone_number: Set(optional_text(request.phone_number)),
        county: Set(optional_text(request.county)),
        farm_name: Set(optional_text(request.farm_name)),
        farm_size: Set(request.farm_size),
        is_extension_agent: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let user_model = new_user.insert(&state.db).await.map_err(user_conflict)?;
    info!("Registered user {} with ID {}", user_model.username, user_model.id);

    let token = issue_token(&user_model, &state.settings.auth)?;
    send_best_effort(
        &state,
        templates::welcome(&state.settings.email, &user_model.email, &user_model.username),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            AuthResponse {
                token,
                user: UserResponse::from(user_model),
            },
            "User registered successfully",
        )),
    ))
}

/// Exchange email and password for a token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || ApiError::Unauthorized {
        code: "INVALID_CREDENTIALS",
        message: "Invalid email or password".to_string(),
    };

    let Some(user_model) = find_by_email(&state, &request.email).await? else {
        debug!("Login attempt for unknown email");
        return Err(invalid());
    };
    if !verify_password(request.password, user_model.password_hash.clone()).await? {
        warn!("Failed login for user {}", user_model.id);
        return Err(invalid());
    }

    let token = issue_token(&user_model, &state.settings.auth)?;
    info!("User {} logged in", user_model.id);
    Ok(Json(ApiResponse::ok(
        AuthResponse {
            token,
            user: UserResponse::from(user_model),
        },
        "Login successful",
    )))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user_model = find_user(&state, auth.0.user_id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user_model), "Profile retrieved successfully")))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth, request))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let existing = find_user(&state, auth.0.user_id).await?;

    let mut active: user::ActiveModel = existing.clone().into();
    let updated_fields = apply_user_changes(&state, &mut active, request.into()).await?;
    debug!("Updating profile fields {:?} for user {}", updated_fields, existing.id);

    let updated = if active.is_changed() {
        active.update(&state.db).await.map_err(user_conflict)?
    } else {
        existing
    };

    Ok(Json(ApiResponse::ok(UserResponse::from(updated), "Profile updated successfully")))
}

/// Start a password reset
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<String>>> {
    if let Some(user_model) = find_by_email(&state, &request.email).await? {
        let token = Uuid::new_v4().to_string();
        state.reset_tokens.insert(token.clone(), user_model.id).await;
        info!("Issued password reset token for user {}", user_model.id);

        send_best_effort(
            &state,
            templates::password_reset(&state.settings.email, &user_model.email, &user_model.username, &token),
        )
        .await;
    } else {
        debug!("Password reset requested for unknown email");
    }

    Ok(Json(ApiResponse::ok(
        FORGOT_PASSWORD_MESSAGE.to_string(),
        FORGOT_PASSWORD_MESSAGE,
    )))
}

/// Complete a password reset with a mailed token
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid or expired reset token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let invalid = || ApiError::bad_request("INVALID_RESET_TOKEN", "Invalid or expired reset token");

    let user_id = state
        .reset_tokens
        .remove(request.token.trim())
        .await
        .ok_or_else(invalid)?;
    let user_model = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    let mut active: user::ActiveModel = user_model.into();
    active.password_hash = Set(hash_password(request.new_password, state.settings.auth.bcrypt_cost).await?);
    active.update(&state.db).await?;
    info!("Password reset for user {}", user_id);

    Ok(Json(ApiResponse::ok(
        "Password has been reset".to_string(),
        "Password reset successfully",
    )))
}
