use super::models::Config;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Soft checks on a composed config. Nothing here blocks startup.
pub fn collect_warnings(config: &Config, warnings: &mut ConfigWarnings) {
    if config.auth.jwt_secret.len() < MIN_SECRET_LEN {
        warnings.push_with_hint(
            format!("JWT secret is shorter than {MIN_SECRET_LEN} bytes"),
            "Generate one with `openssl rand -hex 32`",
        );
    }
    if config.auth.password_pepper.len() < MIN_SECRET_LEN {
        warnings.push(format!(
            "password pepper is shorter than {MIN_SECRET_LEN} bytes"
        ));
    }
    if config.cors.allowed_origins.iter().any(|origin| origin == "*") {
        warnings.push(
            "CORS wildcard origin is ignored; list origins explicitly",
        );
    }
}
