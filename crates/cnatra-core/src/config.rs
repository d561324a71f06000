use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_DIR_NAME: &str = "cnatra";
const CONFIG_FILE_NAME: &str = "config.toml";
const STORE_FILE_NAME: &str = "schedules.json";
pub const DEFAULT_SCHEDULE_URL: &str = "https://www.cnatra.navy.mil/scheds/schedule_data.aspx?sq=";
pub const DEFAULT_USER_AGENT: &str = "cnatra-schedules/0.1";

/// Result returned by [`load_config`], capturing the source and any non-fatal issues.
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: ScraperConfig,
    pub warnings: Vec<String>,
    pub source: ConfigSource,
}

/// Indicates where the configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// No usable `config.toml`; defaults were synthesized.
    Default,
    /// Configuration was read from `config.toml`.
    File,
}

/// Tunables for the scraper, persisted as `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Schedule page URL; the squadron id is appended verbatim.
    pub schedule_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Squadron sessions allowed in flight during a sweep.
    pub concurrency: usize,
    /// Attempts per squadron session before the sweep gives up on it.
    pub max_retries: usize,
    pub retry_backoff_ms: u64,
    pub store_path: String,
    /// Charset used when a response does not declare one.
    pub fallback_charset: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            concurrency: 4,
            max_retries: 3,
            retry_backoff_ms: 1_000,
            store_path: config_directory()
                .join(STORE_FILE_NAME)
                .to_string_lossy()
                .into_owned(),
            fallback_charset: "utf-8".to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule_url.trim().is_empty() {
            return Err(ConfigError::Invalid("schedule_url must not be empty".into()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        Ok(())
    }

    /// Store path with `~` and environment variables expanded.
    pub fn resolved_store_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::full(&self.store_path).map_or_else(
            |_| self.store_path.clone(),
            |expanded| expanded.into_owned(),
        ))
    }

    /// Apply `CNATRA_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| env::var(name).ok())
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CNATRA_SCHEDULE_URL") {
            self.schedule_url = value;
        }
        if let Some(value) = lookup("CNATRA_USER_AGENT") {
            self.user_agent = value;
        }
        if let Some(value) = lookup("CNATRA_STORE_PATH") {
            self.store_path = value;
        }
        parse_override(&lookup, "CNATRA_TIMEOUT_SECS", &mut self.request_timeout_secs)?;
        parse_override(&lookup, "CNATRA_CONCURRENCY", &mut self.concurrency)?;
        parse_override(&lookup, "CNATRA_MAX_RETRIES", &mut self.max_retries)?;
        parse_override(&lookup, "CNATRA_RETRY_BACKOFF_MS", &mut self.retry_backoff_ms)?;
        Ok(())
    }
}

fn parse_override<F, T>(lookup: &F, var: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(parsed) => {
                *target = parsed;
                Ok(())
            }
            Err(err) => Err(ConfigError::Invalid(format!(
                "invalid value for {}: {}",
                var, err
            ))),
        },
        None => Ok(()),
    }
}

/// Path to the configuration directory.
pub fn config_directory() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path to `config.toml`.
pub fn config_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Load `config.toml` from the default location, falling back to defaults.
pub fn load_config() -> ConfigLoadResult {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> ConfigLoadResult {
    let mut warnings = Vec::new();

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<ScraperConfig>(&raw) {
                Ok(config) => {
                    return ConfigLoadResult {
                        config,
                        warnings,
                        source: ConfigSource::File,
                    };
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse {} as TOML: {}. Falling back to defaults.",
                    path.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read {}: {}. Falling back to defaults.",
                path.display(),
                err
            )),
        }
    }

    ConfigLoadResult {
        config: ScraperConfig::default(),
        warnings,
        source: ConfigSource::Default,
    }
}

/// Persist the configuration to the default location.
pub fn save_config(config: &ScraperConfig) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(config, &path)?;
    Ok(path)
}

pub fn save_config_to(config: &ScraperConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(config)?;
    fs::write(path, serialized)?;
    Ok(())
}
