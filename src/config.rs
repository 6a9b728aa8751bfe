//! Runtime configuration
//!
//! Loaded from an optional TOML file; `INTERNAL_APPLICATION_GOOGLE_SCRIPT_URL`
//! in the environment overrides the export URL.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

use crate::application::autosave::DEFAULT_DEBOUNCE;
use crate::application::submission::{DEFAULT_CONFIRMATION_WAIT_SECS, MAX_CONFIRMATION_WAIT_SECS};

pub const GOOGLE_SCRIPT_URL_ENV: &str = "INTERNAL_APPLICATION_GOOGLE_SCRIPT_URL";
pub const DEFAULT_IDENTITY_HEADER: &str = "x-auth-user-id";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Spreadsheet endpoint for application exports
    pub google_script_url: Option<String>,
    /// Header carrying the authenticated user id
    pub identity_header: String,
    pub confirmation_wait_secs: u64,
    pub autosave_debounce_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_script_url: None,
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            confirmation_wait_secs: DEFAULT_CONFIRMATION_WAIT_SECS,
            autosave_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            request_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.confirmation_wait_secs > MAX_CONFIRMATION_WAIT_SECS {
            bail!(
                "confirmation_wait_secs must be at most {} (got {})",
                MAX_CONFIRMATION_WAIT_SECS,
                self.confirmation_wait_secs
            );
        }
        Ok(())
    }

    /// Read `path` if given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(std::env::var(GOOGLE_SCRIPT_URL_ENV).ok());
        Ok(config)
    }

    fn apply_env(&mut self, google_script_url: Option<String>) {
        if let Some(value) = google_script_url.filter(|v| !v.trim().is_empty()) {
            self.google_script_url = Some(value);
        }
    }

    /// The export URL, if configured and well formed
    pub fn export_url(&self) -> Option<Result<Url, url::ParseError>> {
        self.google_script_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(Url::parse)
    }

    pub fn confirmation_wait(&self) -> Duration {
        Duration::from_secs(self.confirmation_wait_secs)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
