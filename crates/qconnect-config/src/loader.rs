use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::server::{ServerConfig, ServerRegistry};
use crate::{ConfigError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "qconnect.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for server in &self.servers {
            if server.id.trim().is_empty() {
                return Err(ConfigError::validation("servers[].id must not be empty"));
            }
            if !ids.insert(server.id.as_str()) {
                return Err(ConfigError::validation(format!(
                    "duplicate server id '{}'",
                    server.id
                )));
            }
            if !names.insert(server.display_name.to_ascii_lowercase()) {
                return Err(ConfigError::validation(format!(
                    "duplicate server display_name '{}'",
                    server.display_name
                )));
            }
            match url::Url::parse(&server.base_address) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => {
                    return Err(ConfigError::validation(format!(
                        "server '{}' base_address must be an absolute http(s) URL",
                        server.id
                    )));
                }
            }
            if server.request_timeout_ms == Some(0) {
                return Err(ConfigError::validation(format!(
                    "server '{}' request_timeout_ms must be > 0",
                    server.id
                )));
            }
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::validation(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        if self.http.request_timeout_ms == 0 {
            return Err(ConfigError::validation("http.request_timeout_ms must be > 0"));
        }
        Ok(())
    }

    /// Server registry with the global request timeout applied where unset
    pub fn registry(&self) -> ServerRegistry {
        let servers = self
            .servers
            .iter()
            .cloned()
            .map(|mut s| {
                s.request_timeout_ms.get_or_insert(self.http.request_timeout_ms);
                s
            })
            .collect();
        ServerRegistry::new(servers)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Load settings from a TOML file (default `qconnect.toml`, skipped if missing)
/// with environment overrides such as `QCONNECT__LOGGING__LEVEL=debug`.
pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
    if pathbuf.exists() {
        builder = builder.add_source(File::from(pathbuf));
    } else if path.is_some() {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", pathbuf.display()),
        )));
    }
    builder = builder.add_source(
        Environment::with_prefix("QCONNECT")
            .try_parsing(true)
            .separator("__"),
    );
    let cfg = builder
        .build()
        .map_err(|e| ConfigError::parse(format!("config build error: {e}")))?;
    let merged: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| ConfigError::parse(format!("config deserialize error: {e}")))?;
    merged.validate()?;
    Ok(merged)
}
