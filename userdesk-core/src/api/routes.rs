//! HTTP route paths.

macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions
pub mod v1 {
    /// Prefix every versioned route shares
    pub const ROOT: &str = "/api/v1";

    /// Authentication and account routes
    pub mod auth {
        /// Exchange credentials for an access token
        pub const JWT_CREATE: &str = v1_path!("/auth/jwt/create");
        /// Form clients post with a trailing slash.
        pub const JWT_CREATE_SLASH: &str = v1_path!("/auth/jwt/create/");

        /// Routes on user records
        pub mod users {
            /// The authenticated requester
            pub const CURRENT: &str = v1_path!("/auth/users/me");
            /// [`CURRENT`] as form clients send it
            pub const CURRENT_SLASH: &str = v1_path!("/auth/users/me/");
        }
    }
}

/// Liveness check, outside the versioned tree
pub const HEALTH: &str = "/health";

/// Strip the `/api/v1` prefix, for mounting routes under a nested router.
pub fn v1_relative(path: &'static str) -> &'static str {
    path.strip_prefix(v1::ROOT).unwrap_or(path)
}
