use std::path::PathBuf;
use std::sync::Arc;

use crate::client::core::HttpChatClient;
use crate::config::ClientConfig;
use crate::transport::HttpTransport;
use crate::Result;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable.
pub struct HttpChatClientBuilder {
    config: Option<ClientConfig>,
    config_path: Option<PathBuf>,
    env_overrides: bool,
    model: Option<String>,
    api_key: Option<String>,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
}

impl HttpChatClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            config_path: None,
            env_overrides: true,
            model: None,
            api_key: None,
            base_url_override: None,
        }
    }

    /// Start from an explicit configuration instead of the defaults.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the starting configuration from a YAML file.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Apply `AI_*` environment overrides (enabled by default).
    pub fn env_overrides(mut self, enable: bool) -> Self {
        self.env_overrides = enable;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the configured base URL.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpChatClient> {
        let mut config = match (self.config, &self.config_path) {
            (Some(cfg), _) => cfg,
            (None, Some(path)) => ClientConfig::from_yaml_file(path)?,
            (None, None) => ClientConfig::default(),
        };

        if let Some(key) = self.api_key {
            config.api_key = Some(key);
        }
        if self.env_overrides {
            config = config.with_env_overrides()?;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(url) = self.base_url_override {
            config.base_url = url;
        }
        config.validate()?;

        if config.api_key.is_none() {
            tracing::warn!(
                api_key_env = %config.api_key_env,
                "no API key configured; requests will be sent without authorization"
            );
        }

        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(HttpChatClient { config, transport })
    }
}

impl Default for HttpChatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
