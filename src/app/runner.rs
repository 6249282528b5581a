use crate::adapters::{Fetcher, LocalStorage};
use crate::app::pipelines::{MatchupPipeline, OddsPipeline, PagePipeline, RunClock};
use crate::config::toml_config::AppConfig;
use crate::core::etl::EtlEngine;
use crate::core::PageFetcher;
use crate::utils::error::{EtlError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// 依序執行三個步驟：對戰機率 → 市場賠率 → 報表頁面
pub struct Runner {
    config: AppConfig,
    storage: LocalStorage,
    monitor: bool,
    clock: RunClock,
}

impl Runner {
    pub fn new(config: AppConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            storage: LocalStorage::new(root),
            monitor: false,
            clock: RunClock::system(),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled;
        self
    }

    pub fn with_clock(mut self, clock: RunClock) -> Self {
        self.clock = clock;
        self
    }

    /// 步驟 1
    pub async fn scrape_matchups<F: PageFetcher>(&self, fetcher: F) -> Result<String> {
        let pipeline = MatchupPipeline::new(self.storage.clone(), fetcher, self.config.clone())
            .with_clock(self.clock);
        EtlEngine::new_with_monitoring(pipeline, self.monitor).run().await
    }

    /// 步驟 2；未設定賠率來源時略過並回傳 None
    pub async fn scrape_odds<F: PageFetcher>(&self, fetcher: F) -> Result<Option<String>> {
        if !self.config.odds_enabled() {
            tracing::info!("⏭️ Odds step disabled or no odds sources configured, skipping");
            return Ok(None);
        }
        let pipeline = OddsPipeline::new(self.storage.clone(), fetcher, self.config.clone())
            .with_clock(self.clock);
        EtlEngine::new_with_monitoring(pipeline, self.monitor)
            .run()
            .await
            .map(Some)
    }

    /// 步驟 3
    pub async fn generate_page(&self) -> Result<String> {
        let pipeline = PagePipeline::new(self.storage.clone(), self.config.clone()).with_clock(self.clock);
        EtlEngine::new_with_monitoring(pipeline, self.monitor).run().await
    }

    /// 完整流程：前兩步失敗只記錄，最後一步失敗才回傳錯誤
    pub async fn run_chain(&self) -> Result<String> {
        let fetcher = match Fetcher::from_config(&self.config.fetch).await {
            Ok(fetcher) => Some(Arc::new(fetcher)),
            Err(e) => {
                log_step_failure("fetcher setup", &e);
                None
            }
        };

        if let Some(fetcher) = &fetcher {
            if let Err(e) = self.scrape_matchups(Arc::clone(fetcher)).await {
                log_step_failure("matchup scrape", &e);
                tracing::warn!("⚠️ Continuing with the previous matchup snapshot");
            }

            if let Err(e) = self.run_chain_odds(Arc::clone(fetcher)).await {
                log_step_failure("market odds", &e);
            }
        }

        if let Some(fetcher) = fetcher.and_then(|f| Arc::try_unwrap(f).ok()) {
            fetcher.shutdown().await;
        }

        self.generate_page().await
    }

    async fn run_chain_odds(&self, fetcher: Arc<Fetcher>) -> Result<()> {
        match self.scrape_odds(fetcher).await? {
            Some(path) => tracing::info!("💰 Market odds saved to {}", path),
            None => tracing::debug!("No market odds this run"),
        }
        Ok(())
    }
}

pub fn log_step_failure(step: &str, e: &EtlError) {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        step,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
}
