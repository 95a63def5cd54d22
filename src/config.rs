//! Environment-driven configuration.
//!
//! Every knob has a default suitable for production use against TMDB, so the
//! proxy runs with an empty environment. Values are extracted from the
//! process environment via figment (e.g. `RETRY_MAX_ATTEMPTS=5`).

use anyhow::Context;
use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the image CDN origin.
    #[serde(default = "default_image_upstream")]
    pub image_upstream: String,
    /// Base URL of the REST API origin.
    #[serde(default = "default_api_upstream")]
    pub api_upstream: String,

    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    /// Timeout applied to each individual upstream attempt.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    /// Outer per-request deadline. Must cover attempts * timeout + backoff.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cache_configuration_secs")]
    pub cache_configuration_secs: u32,
    #[serde(default = "default_cache_search_secs")]
    pub cache_search_secs: u32,
    #[serde(default = "default_cache_popular_secs")]
    pub cache_popular_secs: u32,
    #[serde(default = "default_cache_api_default_secs")]
    pub cache_api_default_secs: u32,
    #[serde(default = "default_cache_image_secs")]
    pub cache_image_secs: u32,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Figment::new()
            .merge(Env::raw())
            .extract()
            .context("Failed to load config")
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_image_upstream() -> String {
    "https://image.tmdb.org".to_string()
}

fn default_api_upstream() -> String {
    "https://api.tmdb.org".to_string()
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    5000
}

fn default_attempt_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    45
}

fn default_cache_configuration_secs() -> u32 {
    3600
}

fn default_cache_search_secs() -> u32 {
    300
}

fn default_cache_popular_secs() -> u32 {
    1800
}

fn default_cache_api_default_secs() -> u32 {
    600
}

fn default_cache_image_secs() -> u32 {
    604800
}

fn default_log_level() -> String {
    "info".to_string()
}
