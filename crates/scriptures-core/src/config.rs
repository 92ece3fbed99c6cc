use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable naming the API base URL. Read at runtime and,
/// as a fallback, at build time.
pub const API_URL_ENV: &str = "FAST_SCRIPTURES_API_URL";

const APP_DIR: &str = "fast-scriptures";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub show_all_volumes: bool,
    pub search_limit: u32,
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            show_all_volumes: false,
            search_limit: DEFAULT_SEARCH_LIMIT,
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join(APP_DIR).join("config.json"))
    }

    /// Where the terminal UI writes its log when `log_file` is unset.
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("fast-scriptures.log"))
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(Self::default_log_path)
    }

    /// Page size for searches, kept inside the server's accepted range.
    pub fn search_limit(&self) -> u32 {
        self.search_limit.clamp(1, MAX_SEARCH_LIMIT)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Base URL from the process environment, this file and the build.
    pub fn resolve_api_url(&self, cli: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        self.resolve_api_url_with(cli, env.as_deref())
    }

    /// Highest first: CLI flag, runtime env, config file, build-time env,
    /// then [`DEFAULT_API_URL`]. Blank values are skipped.
    pub fn resolve_api_url_with(&self, cli: Option<&str>, env: Option<&str>) -> String {
        [cli, env, self.api_url.as_deref(), build_time_api_url()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }
}

pub fn build_time_api_url() -> Option<&'static str> {
    option_env!("FAST_SCRIPTURES_API_URL")
}
