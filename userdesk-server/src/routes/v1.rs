use axum::{
    Router, middleware,
    routing::{get, post},
};

use userdesk_core::api::routes::{v1, v1_relative};

use crate::{
    AppState,
    users::{
        auth::{self, auth_middleware},
        current_user_handlers,
    },
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    let create_token = post(auth::handlers::create_token);

    Router::new()
        .route(v1_relative(v1::auth::JWT_CREATE), create_token.clone())
        .route(v1_relative(v1::auth::JWT_CREATE_SLASH), create_token)
        .merge(create_protected_routes(state))
}

/// Routes that require a bearer token
fn create_protected_routes(state: AppState) -> Router<AppState> {
    let current_user = get(current_user_handlers::get_current_user)
        .put(current_user_handlers::put_current_user)
        .patch(current_user_handlers::patch_current_user);

    Router::new()
        .route(v1_relative(v1::auth::users::CURRENT), current_user.clone())
        .route(v1_relative(v1::auth::users::CURRENT_SLASH), current_user)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
