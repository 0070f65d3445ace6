//! Configuration handling for the TUI

use anyhow::{bail, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_SUPABASE_URL: &str = "FORMATION_SUPABASE_URL";
const ENV_ANON_KEY: &str = "FORMATION_SUPABASE_ANON_KEY";
const ENV_SERVICE_ROLE_KEY: &str = "FORMATION_SERVICE_ROLE_KEY";
const ENV_API_BASE_URL: &str = "FORMATION_API_BASE_URL";

/// Preparer shown on the preparer information step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparerInfo {
    pub name: String,
    pub firm: String,
    pub street: String,
    pub city_state_zip: String,
}

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// Base URL of the hosted auth and data API
    pub supabase_url: Option<String>,
    /// Public project key
    pub supabase_anon_key: Option<String>,
    /// Admin key, only needed to roll back a failed sign-up
    pub service_role_key: Option<String>,
    /// Base URL of the application API serving `/api/create-user`
    pub api_base_url: Option<String>,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Preparer details displayed before the acknowledgment
    pub preparer: Option<PreparerInfo>,
}

/// Connection settings resolved from the config file and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub supabase_url: String,
    pub anon_key: String,
    pub service_role_key: Option<String>,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl TuiConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "formation", "formation-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for the log file
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "formation", "formation-tui")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Read `path`, writing an empty template there on first run
    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: TuiConfig = serde_json::from_str(&content)?;
            return Ok(config);
        }

        let config = Self::default();
        match config.save(path) {
            Ok(()) => tracing::info!(path = %path.display(), "Wrote configuration template"),
            Err(err) => tracing::warn!("Could not write configuration template: {err}"),
        }
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve backend settings, letting the process environment override the file
    pub fn backend_settings(&self) -> Result<BackendSettings> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<BackendSettings> {
        let pick = |key: &str, file: &Option<String>| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.clone())
        };

        let Some(supabase_url) = pick(ENV_SUPABASE_URL, &self.supabase_url) else {
            bail!("No backend URL configured, set {ENV_SUPABASE_URL} or supabase_url in config.json");
        };
        let Some(anon_key) = pick(ENV_ANON_KEY, &self.supabase_anon_key) else {
            bail!("No project key configured, set {ENV_ANON_KEY} or supabase_anon_key in config.json");
        };

        Ok(BackendSettings {
            supabase_url,
            anon_key,
            service_role_key: pick(ENV_SERVICE_ROLE_KEY, &self.service_role_key),
            api_base_url: pick(ENV_API_BASE_URL, &self.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        })
    }
}
