//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_HANDOFF_BASE: &str = "https://wa.me/2348086215207";

/// Messaging hand-off settings.
#[derive(Debug, Clone)]
pub struct HandoffConfig {
    /// Chat deep-link base; the message is appended as `?text=`.
    pub base_url: Url,
    /// Name greeted at the start of the message.
    pub studio_name: String,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_HANDOFF_BASE).expect("default hand-off URL is valid"),
            studio_name: "Jesprec".to_string(),
        }
    }
}

/// Where leads are stored.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Local libSQL file.
    Local { path: PathBuf },
    /// Hosted libSQL database.
    Remote { url: String, auth_token: SecretString },
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreConfig,
    pub handoff: HandoffConfig,
    /// Sessions untouched for this long are pruned.
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            store: StoreConfig::Local {
                path: PathBuf::from("./data/studio-quote.db"),
            },
            handoff: HandoffConfig::default(),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl ServerConfig {
    /// Read configuration from `STUDIO_QUOTE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = get("STUDIO_QUOTE_PORT") {
            config.port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "STUDIO_QUOTE_PORT".into(),
                message: format!("{e}"),
            })?;
        }

        if let Some(url) = get("STUDIO_QUOTE_DB_URL") {
            let token = get("STUDIO_QUOTE_DB_AUTH_TOKEN")
                .ok_or_else(|| ConfigError::MissingEnvVar("STUDIO_QUOTE_DB_AUTH_TOKEN".into()))?;
            config.store = StoreConfig::Remote {
                url,
                auth_token: SecretString::from(token),
            };
        } else if let Some(path) = get("STUDIO_QUOTE_DB_PATH") {
            config.store = StoreConfig::Local {
                path: PathBuf::from(path),
            };
        }

        if let Some(base) = get("STUDIO_QUOTE_HANDOFF_BASE") {
            config.handoff.base_url =
                Url::parse(base.trim()).map_err(|e| ConfigError::InvalidValue {
                    key: "STUDIO_QUOTE_HANDOFF_BASE".into(),
                    message: format!("{e}"),
                })?;
        }

        if let Some(name) = get("STUDIO_QUOTE_STUDIO_NAME") {
            config.handoff.studio_name = name.trim().to_string();
        }

        if let Some(secs) = get("STUDIO_QUOTE_SESSION_IDLE_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "STUDIO_QUOTE_SESSION_IDLE_SECS".into(),
                message: format!("{e}"),
            })?;
            config.session_idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
