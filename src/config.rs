use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const MAX_ITEMS_PER_PAGE: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Files
    pub images_dir: PathBuf,
    pub labels_file: PathBuf,
    pub archive_path: PathBuf,

    // Server
    pub host: String,
    pub port: u16,
    pub items_per_page: usize,

    // Advanced
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("./images"),
            labels_file: PathBuf::from("./labels.txt"),
            archive_path: PathBuf::from("result.zip"),

            host: "0.0.0.0".to_string(),
            port: 18081,
            items_per_page: 10,

            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line. They win over the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub labels_file: Option<PathBuf>,
    pub archive_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub items_per_page: Option<usize>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration: defaults, then the optional JSON file, then
    /// environment variables, then command-line overrides.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match &overrides.config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.apply_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("LABELSORT_IMAGES_DIR") {
            self.images_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("LABELSORT_LABELS_FILE") {
            self.labels_file = PathBuf::from(file);
        }
        if let Ok(path) = std::env::var("LABELSORT_ARCHIVE_PATH") {
            self.archive_path = PathBuf::from(path);
        }
        if let Ok(host) = std::env::var("LABELSORT_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("LABELSORT_PORT") {
            match port.parse::<u16>() {
                Ok(value) => self.port = value,
                Err(e) => {
                    tracing::warn!(
                        "Invalid LABELSORT_PORT value '{}': {}. Using default.",
                        port,
                        e
                    );
                }
            }
        }
        if let Ok(items) = std::env::var("LABELSORT_ITEMS_PER_PAGE") {
            match items.parse::<usize>() {
                Ok(value) => self.items_per_page = value,
                Err(e) => {
                    tracing::warn!(
                        "Invalid LABELSORT_ITEMS_PER_PAGE value '{}': {}. Using default.",
                        items,
                        e
                    );
                }
            }
        }
        if let Ok(level) = std::env::var("LABELSORT_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.images_dir {
            self.images_dir = dir.clone();
        }
        if let Some(file) = &overrides.labels_file {
            self.labels_file = file.clone();
        }
        if let Some(path) = &overrides.archive_path {
            self.archive_path = path.clone();
        }
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(items) = overrides.items_per_page {
            self.items_per_page = items;
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
    }

    /// Validate the whole configuration, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.images_dir.as_os_str().is_empty() {
            errors.push("Images directory cannot be empty".to_string());
        } else if self.images_dir.is_file() {
            errors.push(format!(
                "Images directory exists but is not a directory: {}",
                self.images_dir.display()
            ));
        }

        if self.labels_file.as_os_str().is_empty() {
            errors.push("Labels file cannot be empty".to_string());
        }

        if self.archive_path.as_os_str().is_empty() {
            errors.push("Archive path cannot be empty".to_string());
        } else if self.archive_path.is_dir() {
            errors.push(format!(
                "Archive path is a directory: {}",
                self.archive_path.display()
            ));
        }

        if self.host.is_empty() {
            errors.push("Host cannot be empty".to_string());
        }

        if self.port == 0 {
            errors.push("Port must be greater than 0".to_string());
        }

        if self.items_per_page == 0 {
            errors.push("Items per page must be at least 1".to_string());
        }

        if self.items_per_page > MAX_ITEMS_PER_PAGE {
            errors.push(format!(
                "Items per page is too high (>{})",
                MAX_ITEMS_PER_PAGE
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "Invalid log level: {}. Must be one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ConfigError {
                message: errors.join("; "),
            })
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get log filter based on log level
    pub fn get_log_filter(&self) -> String {
        match self.log_level.as_str() {
            "error" => "labelsort=error,tower_http=error",
            "warn" => "labelsort=warn,tower_http=warn",
            "debug" => "labelsort=debug,tower_http=debug",
            "trace" => "labelsort=trace,tower_http=trace",
            _ => "labelsort=info,tower_http=info",
        }
        .to_string()
    }
}
