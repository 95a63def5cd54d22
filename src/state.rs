//! Application state shared across request handlers.

use crate::config::Config;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Outbound client for the image CDN. Carries no client-level timeout;
    /// each retry attempt applies its own.
    pub image_client: reqwest::Client,
    /// Outbound client for the REST API.
    pub api_client: reqwest::Client,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let image_client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .build()
            .context("Failed to build image upstream client")?;

        let api_client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .build()
            .context("Failed to build API upstream client")?;

        Ok(Self {
            config: Arc::new(config),
            image_client,
            api_client,
            started_at: Utc::now(),
        })
    }
}
