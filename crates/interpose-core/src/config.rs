//! # Pipeline Configuration
//!
//! YAML configuration for the standard pipeline. Every field has a default
//! that reproduces the reference behavior, so an empty document is a valid
//! configuration:
//!
//! ```yaml
//! auth:
//!   parameter: auth
//!   sentinel: authenticated
//!   on_failure: swallow     # or: propagate
//!   tag: manager
//!   order: 1
//! logging:
//!   namespace: controller
//!   order: 2147483647
//! ```
//!
//! `INTERPOSE_AUTH_PARAM` and `INTERPOSE_SENTINEL` override the auth
//! parameter and sentinel after the file is loaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::auth_gate::FailurePolicy;
use crate::error::ConfigError;

/// Environment variable overriding [`AuthSettings::parameter`].
pub const ENV_AUTH_PARAM: &str = "INTERPOSE_AUTH_PARAM";

/// Environment variable overriding [`AuthSettings::sentinel`].
pub const ENV_SENTINEL: &str = "INTERPOSE_SENTINEL";

/// Auth gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSettings {
    /// Parameter whose value is compared with the sentinel.
    pub parameter: String,
    /// Literal value that lets a call through.
    pub sentinel: String,
    /// Handling of wrapped-call failures on the authenticated path.
    pub on_failure: FailurePolicy,
    /// Operations carrying this tag are gated.
    pub tag: String,
    /// Chain position; lower runs further out.
    pub order: i32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            parameter: "auth".to_string(),
            sentinel: "authenticated".to_string(),
            on_failure: FailurePolicy::Swallow,
            tag: "manager".to_string(),
            order: 1,
        }
    }
}

/// Call logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Operations in this namespace (or below it) are logged.
    pub namespace: String,
    /// Chain position; lower runs further out.
    pub order: i32,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            namespace: "controller".to_string(),
            order: i32::MAX,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterposeConfig {
    pub auth: AuthSettings,
    pub logging: LoggingSettings,
}

impl InterposeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = if source.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(source)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded interpose configuration");
        Ok(config)
    }

    /// Reject settings that would make a selector or the gate meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("auth.parameter", &self.auth.parameter),
            ("auth.sentinel", &self.auth.sentinel),
            ("auth.tag", &self.auth.tag),
            ("logging.namespace", &self.logging.namespace),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
            }
        }
        Ok(())
    }

    /// Apply [`ENV_AUTH_PARAM`] / [`ENV_SENTINEL`] from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup, then re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(parameter) = lookup(ENV_AUTH_PARAM) {
            tracing::info!(parameter = %parameter, "auth parameter overridden from environment");
            self.auth.parameter = parameter;
        }
        if let Some(sentinel) = lookup(ENV_SENTINEL) {
            tracing::info!("auth sentinel overridden from environment");
            self.auth.sentinel = sentinel;
        }
        self.validate()
    }
}
