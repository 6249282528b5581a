//! Headless Chrome fetching via chromiumoxide, for pages that render their
//! tables with JavaScript.

use crate::config::toml_config::FetchConfig;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{EtlError, Result};
use crate::utils::retry::{retry, RetryConfig};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;

fn browser_error(context: &str, e: impl std::fmt::Display) -> EtlError {
    EtlError::BrowserError {
        message: format!("{}: {}", context, e),
    }
}

pub struct BrowserFetcher {
    browser: Browser,
    handle: tokio::task::JoinHandle<()>,
    retry: RetryConfig,
    wait_selector: Option<String>,
    settle_time: Duration,
    timeout: Duration,
}

impl BrowserFetcher {
    pub async fn launch(config: &FetchConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={}", config.user_agent))
            .window_size(1600, 1000);
        if let Some(executable) = &config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        let browser_config = builder
            .build()
            .map_err(|e| browser_error("Failed to build browser config", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| browser_error("Failed to launch browser", e))?;

        // handler 必須持續輪詢，瀏覽器才會回應
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        tracing::info!("🌐 Headless browser launched");

        Ok(Self {
            browser,
            handle,
            retry: config.retry_config(),
            wait_selector: config.wait_selector.clone(),
            settle_time: Duration::from_millis(config.browser_wait_ms),
            timeout: config.timeout(),
        })
    }

    async fn wait_for_content(&self, page: &Page) -> Result<()> {
        let Some(selector) = &self.wait_selector else {
            tokio::time::sleep(self.settle_time).await;
            return Ok(());
        };

        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if page.find_element(selector.as_str()).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(browser_error(
                    "Timed out waiting for selector",
                    selector,
                ));
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| browser_error("Failed to open page", e))?;

        let content = match self.wait_for_content(&page).await {
            Ok(()) => page
                .content()
                .await
                .map_err(|e| browser_error("Failed to read page content", e)),
            Err(e) => Err(e),
        };

        let _ = page.close().await;
        content
    }

    pub async fn close(mut self) {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handle.abort();
    }
}

impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        retry(&self.retry, url, || self.fetch_once(url)).await
    }
}
