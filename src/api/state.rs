// src/api/state.rs
use crate::config::AppConfig;
use crate::providers::UpstreamClient;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Built once at startup; `None` when the provider credential is missing.
    pub upstream: Option<Arc<UpstreamClient>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let upstream = UpstreamClient::from_config(Client::new(), &config.upstream).map(Arc::new);
        Self {
            config: Arc::new(config),
            upstream,
        }
    }
}
