//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Environment variables consulted for the API key, in order
pub const API_KEY_ENV_VARS: [&str; 3] = ["STYLIST_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// Default upper bound for a source image (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Stylist configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub upload: UploadConfig,
    pub output: OutputConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Client-side timeout; `None` leaves it to the transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub file_stem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub loading_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                api_key: None,
                model: "gemini-2.5-flash-image".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                timeout_secs: None,
            },
            upload: UploadConfig {
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            output: OutputConfig {
                directory: PathBuf::from("."),
                file_stem: "ai-styled-image".to_string(),
            },
            ui: UiConfig {
                loading_interval_ms: 3000,
            },
        }
    }
}

impl ApiConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolve_api_key_with(|name| env::var(name).ok())
    }

    /// Resolve the key through an arbitrary variable lookup
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> anyhow::Result<Option<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.enforce_env_only()?;

        Ok(API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty()))
    }

    /// The key, or `MissingCredential` when none is set
    pub fn require_api_key(&self) -> crate::Result<String> {
        match self.resolved_api_key() {
            Ok(Some(key)) => Ok(key),
            Ok(None) => Err(Error::MissingCredential),
            Err(e) => Err(Error::ConfigError(e.to_string())),
        }
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key().map(|opt| opt.map(|key| redact(&key)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        "***".to_string()
    } else {
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", suffix)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("STYLIST_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("stylist")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.enforce_env_only()?;
        if self.upload.max_bytes == 0 {
            return Err(anyhow!("upload.max_bytes must be greater than zero"));
        }
        if self.output.file_stem.trim().is_empty() {
            return Err(anyhow!("output.file_stem must not be empty"));
        }
        if self.ui.loading_interval_ms == 0 {
            return Err(anyhow!("ui.loading_interval_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "api.model" => Ok(self.api.model.clone()),
            "api.base_url" => Ok(self.api.base_url.clone()),
            "api.timeout_secs" => Ok(self
                .api
                .timeout_secs
                .map(|secs| secs.to_string())
                .unwrap_or_else(|| "(transport default)".to_string())),

            "upload.max_bytes" => Ok(self.upload.max_bytes.to_string()),

            "output.directory" => Ok(self.output.directory.display().to_string()),
            "output.file_stem" => Ok(self.output.file_stem.clone()),

            "ui.loading_interval_ms" => Ok(self.ui.loading_interval_ms.to_string()),

            // API key (special handling - show redacted)
            "api.api_key" | "api_key" => match self.api.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok("(not set - use STYLIST_API_KEY or GEMINI_API_KEY env var)".to_string()),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `stylist config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api.model" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Model must not be empty"));
                }
                self.api.model = value.trim().to_string();
            }
            "api.base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(anyhow!("Base URL must start with http:// or https://"));
                }
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                // 0 hands the timeout back to the transport
                self.api.timeout_secs = (secs > 0).then_some(secs);
            }

            "upload.max_bytes" => {
                let bytes: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid max_bytes value: {}", value))?;
                if bytes == 0 {
                    return Err(anyhow!("max_bytes must be greater than zero"));
                }
                self.upload.max_bytes = bytes;
            }

            "output.directory" => {
                self.output.directory = PathBuf::from(value);
            }
            "output.file_stem" => {
                if value.trim().is_empty() || value.contains(['/', '\\']) {
                    return Err(anyhow!("Invalid file stem: {}", value));
                }
                self.output.file_stem = value.to_string();
            }

            "ui.loading_interval_ms" => {
                let ms: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid loading_interval_ms value: {}", value))?;
                if ms == 0 {
                    return Err(anyhow!("loading_interval_ms must be greater than zero"));
                }
                self.ui.loading_interval_ms = ms;
            }

            // API key cannot be set via config
            "api.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set the STYLIST_API_KEY or GEMINI_API_KEY environment variable instead."
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `stylist config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "api.model",
            "api.base_url",
            "api.timeout_secs",
            "api.api_key",
            "upload.max_bytes",
            "output.directory",
            "output.file_stem",
            "ui.loading_interval_ms",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
