use crate::config::ClientConfig;
use crate::Result;
use reqwest::Proxy;
use std::time::Duration;

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST a JSON body. Non-2xx statuses are returned as-is for the caller to classify.
    pub async fn post_json(
        &self,
        path: &str,
        request_body: &serde_json::Value,
        client_request_id: &str,
    ) -> Result<reqwest::Response> {
        let mut req = self.client.post(self.url(path)).json(request_body);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        // Our own correlation id. Providers may ignore it, but logs can use it for linkage.
        req = req.header("x-request-id", client_request_id);

        req.send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
