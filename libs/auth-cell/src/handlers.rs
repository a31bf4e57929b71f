use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, LoginRequest, ProfileResponse, SignupRequest};
use crate::services::account::AccountService;

fn map_auth_error(err: AuthError) -> AppError {
    match err {
        AuthError::MissingFields => AppError::BadRequest(err.to_string()),
        AuthError::DuplicateUsername => AppError::field("username", "Username already exists"),
        AuthError::DuplicateEmail => AppError::field("email", "Email already exists"),
        AuthError::InvalidCredentials => AppError::BadRequest("Invalid credentials".to_string()),
        AuthError::UserNotFound => AppError::NotFound("User not found".to_string()),
        _ => AppError::Internal(err.to_string()),
    }
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let service = AccountService::new(&state);

    let user = service.signup(request).await.map_err(map_auth_error)?;

    let token = issue_token(
        &user.id.to_string(),
        &user.username,
        &user.email,
        &state.app_jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = AccountService::new(&state);

    let user = service.login(request).await.map_err(map_auth_error)?;

    let token = issue_token(
        &user.id.to_string(),
        &user.username,
        &user.email,
        &state.app_jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(TokenResponse { token }))
}

/// Tokens are stateless, so logout has nothing to revoke server-side.
#[axum::debug_handler]
pub async fn logout(Extension(user): Extension<User>) -> Result<Json<Value>, AppError> {
    debug!("User {} logged out", user.id);
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<ProfileResponse>, AppError> {
    debug!("Getting profile for user: {}", user.id);

    let service = AccountService::new(&state);
    let record = service.get_profile(&user.id).await.map_err(map_auth_error)?;

    Ok(Json(ProfileResponse {
        username: record.username,
        email: record.email,
        first_name: record.first_name,
        last_name: record.last_name,
    }))
}
