use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
    users::{auth::jwt::IssuedToken, extract::ApiJson},
};

#[derive(Debug, Deserialize)]
pub struct TokenCreateRequest {
    pub email: String,
    pub password: String,
}

const INVALID_CREDENTIALS: &str =
    "No active account found with the given credentials";

/// Exchange email and password for an access token.
pub async fn create_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TokenCreateRequest>,
) -> AppResult<Json<IssuedToken>> {
    let user = state
        .users
        .get_user_by_email(request.email.trim())
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let password_hash = state
        .users
        .get_user_password_hash(user.id)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let verified = state
        .password_crypto
        .verify_password(&request.password, &password_hash)
        .map_err(|err| {
            AppError::internal(format!("Invalid password hash: {err}"))
        })?;

    if !verified || !user.is_active {
        warn!(
            user_id = %user.id,
            active = user.is_active,
            "token request rejected"
        );
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state
        .jwt
        .issue(user.id)
        .map_err(|err| {
            AppError::internal(format!(
                "Failed to generate access token: {err}"
            ))
        })?;

    info!(user_id = %user.id, "issued access token");
    Ok(Json(issued))
}
