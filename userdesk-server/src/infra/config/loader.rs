use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;
use url::Url;

use super::{
    models::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{ConfigWarnings, collect_warnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("userdesk.toml"),
        PathBuf::from("config/userdesk.toml"),
    ]
});

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 900;

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Resolve `.env`, the TOML file and the process environment into a config.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path)
                .map(|_| true)
                .or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Same as [`Self::load`] with an explicit environment snapshot.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };
        compose_config(file_config, env, metadata)
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let source = ConfigPathSource {
            explicit: self.options.config_path.clone(),
            env: env.config_path.clone(),
            default: DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned(),
        };

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

/// Merge file and environment layers; the environment wins.
pub fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<ConfigLoad, ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No userdesk.toml detected; falling back to environment variables",
            "Set USERDESK_CONFIG or pass --config to use a file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        auth: file_auth,
        cors: file_cors,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let url = env
        .database_url
        .or(file_database.url)
        .ok_or(ConfigLoadError::MissingValue {
            key: "DATABASE_URL",
        })?;
    validate_database_url(&url)?;
    let database = DatabaseConfig {
        url,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };

    let auth = AuthConfig {
        jwt_secret: env
            .jwt_secret
            .or(file_auth.jwt_secret)
            .ok_or(ConfigLoadError::MissingValue { key: "JWT_SECRET" })?,
        password_pepper: env
            .auth_password_pepper
            .or(file_auth.password_pepper)
            .ok_or(ConfigLoadError::MissingValue {
                key: "AUTH_PASSWORD_PEPPER",
            })?,
        access_token_ttl_secs: env
            .access_token_ttl_secs
            .or(file_auth.access_token_ttl_secs)
            .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS),
    };
    if auth.access_token_ttl_secs == 0 {
        return Err(ConfigLoadError::InvalidValue {
            key: "ACCESS_TOKEN_TTL_SECS",
            reason: "must be greater than zero".to_string(),
        });
    }

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
    };

    let config = Config {
        server,
        database,
        auth,
        cors,
        metadata,
    };
    collect_warnings(&config, &mut warnings);

    Ok(ConfigLoad { config, warnings })
}

fn validate_database_url(raw: &str) -> Result<(), ConfigLoadError> {
    let parsed = Url::parse(raw)
        .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(()),
        other => Err(ConfigLoadError::UnsupportedDatabaseScheme {
            scheme: other.to_string(),
        }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{key} must be provided")]
    MissingValue { key: &'static str },
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error(
        "unsupported database scheme '{scheme}': must be postgres:// or \
         postgresql://"
    )]
    UnsupportedDatabaseScheme { scheme: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        if let Some(path) = &self.default {
            return Some((path.clone(), ConfigPathProvenance::Default));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(
            self,
            ConfigPathProvenance::Explicit | ConfigPathProvenance::Env
        )
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
