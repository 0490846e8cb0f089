pub mod handlers;
pub mod jwt;
pub mod middleware;

pub use middleware::auth_middleware;
