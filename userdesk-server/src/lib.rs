//! # Userdesk Server
//!
//! Axum front end for the current-user profile endpoint. Requests are
//! authenticated with HS256 bearer tokens; updates pass through the
//! staff-gated field policy in `userdesk-core` before they are persisted.

pub mod errors;
pub mod infra;
pub mod routes;
pub mod users;

pub use infra::app_state::AppState;
