// Adapters layer: concrete implementations for external systems (storage, http, browser).

#[cfg(feature = "browser")]
pub mod browser;
pub mod http;
pub mod storage;

use crate::config::toml_config::{FetchConfig, FetchMode};
use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;

pub use http::HttpFetcher;
pub use storage::LocalStorage;

/// 依配置選擇抓取方式
pub enum Fetcher {
    Http(HttpFetcher),
    #[cfg(feature = "browser")]
    Browser(browser::BrowserFetcher),
}

impl Fetcher {
    pub async fn from_config(config: &FetchConfig) -> Result<Self> {
        match config.mode {
            FetchMode::Http => Ok(Fetcher::Http(HttpFetcher::new(config)?)),
            #[cfg(feature = "browser")]
            FetchMode::Browser => Ok(Fetcher::Browser(
                browser::BrowserFetcher::launch(config).await?,
            )),
            #[cfg(not(feature = "browser"))]
            FetchMode::Browser => Err(crate::utils::error::EtlError::ConfigError {
                message: "fetch.mode = \"browser\" requires building with the `browser` feature"
                    .to_string(),
            }),
        }
    }

    /// 關閉瀏覽器等外部資源
    pub async fn shutdown(self) {
        match self {
            Fetcher::Http(_) => {}
            #[cfg(feature = "browser")]
            Fetcher::Browser(browser) => browser.close().await,
        }
    }
}

impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        match self {
            Fetcher::Http(http) => http.fetch(url).await,
            #[cfg(feature = "browser")]
            Fetcher::Browser(browser) => browser.fetch(url).await,
        }
    }
}
