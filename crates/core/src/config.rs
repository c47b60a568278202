use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::model::{User, UserId};

static DEFAULT_API_URL: &str = "https://mate.academy/students-api";
static DEFAULT_CONFIG_NAME: &str = "config.json";
static DEFAULT_TIMEOUT_SECS: u64 = 10;
static ENV_API_URL: &str = "TASKLIST_API_URL";
static ENV_USER_ID: &str = "TASKLIST_USER_ID";
static ENV_CONFIG: &str = "TASKLIST_CONFIG";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "tasklist", "tasklist"));

/// Values supplied on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub user_id: Option<UserId>,
    pub config_path: Option<PathBuf>,
}

/// On-disk shape of the optional config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    user_id: Option<UserId>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    api_url: String,
    user: Option<User>,
    request_timeout: Duration,
}

impl AppConfig {
    /// Construct [`AppConfig`] by layering the provided overrides, environment variables,
    /// the config file and built-in defaults.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        let file = match resolve_config_path(overrides.config_path.clone()) {
            Some(path) => read_config_file(&path)?,
            None => ConfigFile::default(),
        };

        let api_url = overrides
            .api_url
            .or_else(|| env::var(ENV_API_URL).ok())
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let user_id = match overrides.user_id {
            Some(id) => Some(id),
            None => match env::var(ENV_USER_ID) {
                Ok(raw) => Some(
                    raw.trim()
                        .parse::<UserId>()
                        .with_context(|| format!("{ENV_USER_ID} must be an integer, got '{raw}'"))?,
                ),
                Err(_) => file.user_id,
            },
        };

        let timeout = file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(Self::new(api_url, user_id.map(User::new), Duration::from_secs(timeout)))
    }

    /// Construct [`AppConfig`] directly from resolved values.
    pub fn new(api_url: impl Into<String>, user: Option<User>, request_timeout: Duration) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            api_url,
            user,
            request_timeout,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn user(&self) -> Option<User> {
        self.user
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn resolve_config_path(path_override: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = path_override {
        return Some(path);
    }

    if let Ok(env_path) = env::var(ENV_CONFIG) {
        return Some(PathBuf::from(env_path));
    }

    PROJECT_DIRS
        .as_ref()
        .map(|project| project.config_dir().join(DEFAULT_CONFIG_NAME))
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))
}
