use crate::config::toml_config::FetchConfig;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{EtlError, Result};
use crate::utils::retry::{retry, RetryConfig};
use reqwest::Client;

/// 直接以 HTTP 取得頁面（不執行 JavaScript）
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            retry: config.retry_config(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        tracing::debug!("Making HTTP request to: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("HTTP response status: {}", status);

        if !status.is_success() {
            return Err(EtlError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        retry(&self.retry, url, || self.fetch_once(url)).await
    }
}
