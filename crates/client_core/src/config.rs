use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::filters::{DEFAULT_ORDER, DEFAULT_PAGE_SIZE};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub order: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 15,
            page_size: DEFAULT_PAGE_SIZE,
            order: DEFAULT_ORDER.into(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    page_size: Option<u32>,
    order: Option<String>,
}

/// Defaults, then `catalog.toml` in the working directory if it parses, then
/// environment overrides.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();
    if let Ok(raw) = fs::read_to_string(DEFAULT_SETTINGS_FILE) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => tracing::warn!(error = %err, "ignoring malformed {DEFAULT_SETTINGS_FILE}"),
        }
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Like [`load_settings`] but with an explicit file that must exist and parse.
pub fn load_settings_from(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;

    let mut settings = ClientSettings::default();
    apply_file_settings(&mut settings, file_cfg);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = normalize_api_base_url(&v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.order {
        settings.order = v;
    }
}

pub(crate) fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CATALOG_API_URL") {
        settings.api_base_url = normalize_api_base_url(&v);
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_base_url = normalize_api_base_url(&v);
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = lookup("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.page_size = parsed;
        }
    }
    if let Some(v) = lookup("APP__ORDER") {
        if !v.trim().is_empty() {
            settings.order = v.trim().to_string();
        }
    }
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');
    if raw.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    if raw.contains("://") {
        return raw.to_string();
    }
    format!("http://{raw}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
