use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Base URL used when neither configuration nor environment supplies one.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Name of the variable the deployment injects at runtime. The same variable
/// configures the browser bundle served by `huddle-web`.
pub const INJECTED_BASE_URL_VAR: &str = "VITE_API_BASE_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Load settings from an optional TOML file merged with `HUDDLE_`-prefixed
    /// environment variables (e.g. `HUDDLE_API_BASE_URL`). A missing default
    /// file is fine; an explicitly named file must exist.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                builder = builder.add_source(File::with_name(p));
            }
            None => {
                if let Some(p) = default_config_path() {
                    builder = builder.add_source(File::from(p).required(false));
                }
            }
        }
        let s = builder
            .add_source(Environment::with_prefix("HUDDLE"))
            .build()?;
        s.try_deserialize()
    }

    /// Resolved API base URL, honoring the runtime-injected variable when the
    /// configuration does not name one.
    pub fn base_url(&self) -> String {
        let injected = std::env::var(INJECTED_BASE_URL_VAR).ok();
        resolve_api_base_url(self.api_base_url.as_deref(), injected.as_deref())
    }
}

/// Precedence: explicit configuration, then the injected runtime variable,
/// then the compiled-in default. Blank values count as absent.
pub fn resolve_api_base_url(configured: Option<&str>, injected: Option<&str>) -> String {
    let pick = |v: Option<&str>| {
        v.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    pick(configured)
        .or_else(|| pick(injected))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

fn default_config_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("dev", "huddle", "huddle")?;
    Some(dirs.config_dir().join("huddle.toml"))
}
