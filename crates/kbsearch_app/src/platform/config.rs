//! App configuration: optional `kbsearch.ron` plus environment overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use kb_logging::kb_info;
use kbsearch_client::{ClientSettings, DriverSettings};
use kbsearch_core::{Locale, SessionConfig, DEFAULT_TOP_K, HISTORY_CAP};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "kbsearch.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server root; `/api` is appended.
    pub api_url: String,
    pub locale: String,
    pub top_k: usize,
    pub history_limit: usize,
    pub request_timeout_secs: u64,
    pub preview_timeout_secs: u64,
    pub log: LogDestination,
    pub verbose: bool,
    /// Pre-issued bearer token; normally supplied via `KBSEARCH_TOKEN`.
    pub token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            locale: "ja".to_string(),
            top_k: DEFAULT_TOP_K,
            history_limit: HISTORY_CAP,
            request_timeout_secs: 120,
            preview_timeout_secs: 20,
            log: LogDestination::File,
            verbose: false,
            token: None,
        }
    }
}

impl AppConfig {
    /// Read `path` if it exists; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()));
            }
        };
        let config = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        kb_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("KBSEARCH_API_URL") {
            self.api_url = url;
        }
        if let Some(token) = lookup("KBSEARCH_TOKEN") {
            self.token = Some(token);
        }
        if let Some(locale) = lookup("KBSEARCH_LOCALE") {
            self.locale = locale;
        }
    }

    pub fn locale(&self) -> Result<Locale> {
        self.locale
            .parse()
            .map_err(|err: String| anyhow::anyhow!(err))
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            locale: self.locale()?,
            top_k: self.top_k,
            history_limit: self.history_limit,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: format!("{}/api", self.api_url.trim_end_matches('/')),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientSettings::default()
        }
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            preview_timeout: Duration::from_secs(self.preview_timeout_secs),
        }
    }
}
