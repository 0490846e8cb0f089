use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub jwt_secret: Option<String>,
    pub auth_password_pepper: Option<String>,
    pub access_token_ttl_secs: Option<u64>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get =
            |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            config_path: get("USERDESK_CONFIG").map(PathBuf::from),
            server_host: get("SERVER_HOST"),
            server_port: get("SERVER_PORT").and_then(|s| s.parse().ok()),
            database_url: get("DATABASE_URL"),
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok()),
            jwt_secret: get("JWT_SECRET"),
            auth_password_pepper: get("AUTH_PASSWORD_PEPPER"),
            access_token_ttl_secs: get("ACCESS_TOKEN_TTL_SECS")
                .and_then(|s| s.parse().ok()),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw)),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_parses_lists_and_numbers() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SERVER_PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
            ("JWT_SECRET", "   "),
        ]);
        let env =
            EnvConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env.server_port, Some(8080));
        assert_eq!(
            env.cors_allowed_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert!(env.jwt_secret.is_none());
    }
}
