use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::CredentialDescriptor;

pub const DEFAULT_BASE_URL: &str = "https://api.example.com/v1";
pub const BASE_URL_ENV: &str = "DEVPORTAL_BASE_URL";

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub base_url: String,
    pub descriptors: Vec<CredentialDescriptor>,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            descriptors: Vec::new(),
            request_timeout_secs: None,
            log_filter: "info".to_string(),
        }
    }
}

impl PlaygroundConfig {
    /// Load from `path`, falling back to defaults when the file is absent,
    /// then apply the environment override.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::load_file(path)?;
        Ok(config.with_base_url_override(std::env::var(BASE_URL_ENV).ok()))
    }

    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
