use axum::{Extension, Json, extract::State};

use userdesk_core::domain::users::{
    CurrentUserView, RequestContext, UpdateMode, User,
};

use crate::{
    errors::AppResult, infra::app_state::AppState, users::extract::UpdateInput,
};

/// Current-user view of the authenticated requester.
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<CurrentUserView>> {
    Ok(Json(state.updater.view(user).await?))
}

/// Full update; `first_name` and `last_name` must be present.
pub async fn put_current_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    UpdateInput(input): UpdateInput,
) -> AppResult<Json<CurrentUserView>> {
    let view = state
        .updater
        .update_current_user(&ctx, &input, UpdateMode::Replace)
        .await?;
    Ok(Json(view))
}

pub async fn patch_current_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    UpdateInput(input): UpdateInput,
) -> AppResult<Json<CurrentUserView>> {
    let view = state
        .updater
        .update_current_user(&ctx, &input, UpdateMode::Partial)
        .await?;
    Ok(Json(view))
}
