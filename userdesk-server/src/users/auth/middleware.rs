use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use userdesk_core::domain::users::RequestContext;

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

/// Resolve the bearer token to a stored, active user.
///
/// On success the [`User`](userdesk_core::domain::users::User) and its
/// [`RequestContext`] are added to the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = extract_bearer_token(&request)?;

    let claims = state.jwt.validate(token).map_err(|err| {
        debug!(error = %err, "rejected bearer token");
        AppError::unauthorized("Invalid or expired token")
    })?;

    let user = state
        .users
        .get_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

    if !user.is_active {
        warn!(user_id = %user.id, "inactive user presented a valid token");
        return Err(AppError::unauthorized("User account is disabled"));
    }

    let ctx = RequestContext::for_user(&user);
    request.extensions_mut().insert(ctx);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> AppResult<&str> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::unauthorized(
                "Authentication credentials were not provided",
            )
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header"))
}
