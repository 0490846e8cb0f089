pub mod auth;
pub mod current_user_handlers;
pub mod extract;
