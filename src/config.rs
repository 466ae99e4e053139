// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    2
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_description")]
    pub description: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            description: default_app_description(),
        }
    }
}

fn default_app_name() -> String {
    "Flashdeck".to_string()
}

fn default_app_description() -> String {
    "A question and answer flashcard catalog".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    /// Cards per page on the public catalog and tag listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Cards per page on the operator listing.
    #[serde(default = "default_operator_page_size")]
    pub operator_page_size: u32,
    /// How long the memoized total card count stays valid.
    #[serde(default = "default_count_cache_ttl_seconds")]
    pub count_cache_ttl_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            operator_page_size: default_operator_page_size(),
            count_cache_ttl_seconds: default_count_cache_ttl_seconds(),
        }
    }
}

fn default_page_size() -> u32 {
    30
}

fn default_operator_page_size() -> u32 {
    10
}

fn default_count_cache_ttl_seconds() -> u64 {
    60
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_session_cookie_name(),
            ttl_hours: default_session_ttl_hours(),
        }
    }
}

fn default_session_cookie_name() -> String {
    "flashdeck_session".to_string()
}

fn default_session_ttl_hours() -> u64 {
    12
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PasswordHashingParams {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHashingParams {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_memory_kib() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

/// Raw configuration as read from config.yaml before validation.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub password: PasswordHashingParams,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub sessions: SessionConfig,
    pub password: PasswordHashingParams,
}

const KNOWN_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn load_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_yaml::from_str(&content)
        .map_err(|e| ConfigError::LoadError(format!("Failed to parse {}: {}", path.display(), e)))
}

pub fn validate_config(raw: RawConfig) -> Result<ValidatedConfig, ConfigError> {
    if raw.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port must be non-zero".to_string(),
        ));
    }
    if raw.server.workers == 0 {
        return Err(ConfigError::ValidationError(
            "server.workers must be at least 1".to_string(),
        ));
    }
    if raw.server.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "server.host must not be empty".to_string(),
        ));
    }
    if raw.catalog.page_size == 0 || raw.catalog.operator_page_size == 0 {
        return Err(ConfigError::ValidationError(
            "catalog page sizes must be at least 1".to_string(),
        ));
    }
    if raw.sessions.ttl_hours == 0 {
        return Err(ConfigError::ValidationError(
            "sessions.ttl_hours must be at least 1".to_string(),
        ));
    }
    if raw.sessions.cookie_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "sessions.cookie_name must not be empty".to_string(),
        ));
    }
    let level = raw.logging.level.to_lowercase();
    if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "logging.level must be one of {:?}, got '{}'",
            KNOWN_LOG_LEVELS, raw.logging.level
        )));
    }
    if raw.password.parallelism == 0 || raw.password.iterations == 0 {
        return Err(ConfigError::ValidationError(
            "password hashing parameters must be non-zero".to_string(),
        ));
    }

    Ok(ValidatedConfig {
        server: raw.server,
        app: raw.app,
        logging: LoggingConfig { level },
        catalog: raw.catalog,
        sessions: raw.sessions,
        password: raw.password,
    })
}
