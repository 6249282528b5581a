use crate::app::pipelines::RunClock;
use crate::config::toml_config::{AppConfig, OddsSource};
use crate::core::{archive, merge, MarketOdds, OddsMergeResult, PageFetcher, Pipeline, Storage};
use crate::scrape::OddsParser;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;

/// 步驟 2：抓取博彩公司賠率並併入最新的對戰快照
pub struct OddsPipeline<S: Storage, F: PageFetcher> {
    storage: S,
    fetcher: F,
    config: AppConfig,
    clock: RunClock,
}

impl<S: Storage, F: PageFetcher> OddsPipeline<S, F> {
    pub fn new(storage: S, fetcher: F, config: AppConfig) -> Self {
        Self {
            storage,
            fetcher,
            config,
            clock: RunClock::system(),
        }
    }

    pub fn with_clock(mut self, clock: RunClock) -> Self {
        self.clock = clock;
        self
    }

    async fn scrape_source(&self, index: usize, source: &OddsSource) -> Result<Vec<MarketOdds>> {
        source.validate_at(index)?;
        let body = self.fetcher.fetch(&source.url).await?;
        OddsParser::parse(&body, source)
    }
}

#[async_trait]
impl<S: Storage, F: PageFetcher> Pipeline for OddsPipeline<S, F> {
    type Extracted = Vec<MarketOdds>;
    type Transformed = OddsMergeResult;

    fn name(&self) -> &str {
        "market odds"
    }

    async fn extract(&self) -> Result<Vec<MarketOdds>> {
        let sources = &self.config.odds.sources;
        if sources.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "odds.sources".to_string(),
            });
        }

        let mut odds = Vec::new();
        let mut failures = 0usize;

        for (i, source) in sources.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.fetch.request_delay()).await;
            }

            match self.scrape_source(i, source).await {
                Ok(found) => {
                    tracing::info!("💰 {} events from {}", found.len(), source.name);
                    odds.extend(found);
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!("⚠️ Skipping odds source {}: {}", source.name, e);
                }
            }
        }

        if failures == sources.len() {
            return Err(EtlError::ProcessingError {
                message: format!("all {} odds sources failed", failures),
            });
        }

        Ok(odds)
    }

    async fn transform(&self, market_odds: Vec<MarketOdds>) -> Result<OddsMergeResult> {
        let archive_config = &self.config.archive;
        let Some(snapshot) =
            archive::load_latest(&self.storage, &archive_config.dir, &archive_config.matchup_prefix).await?
        else {
            tracing::warn!("⚠️ No matchup snapshot to merge odds into");
            return Ok(OddsMergeResult {
                market_odds,
                ..Default::default()
            });
        };

        // 沒有賠率時不重寫對戰快照
        if market_odds.is_empty() {
            tracing::warn!("⚠️ Odds sources returned no events; leaving {} untouched", snapshot.path);
            return Ok(OddsMergeResult {
                market_odds,
                ..Default::default()
            });
        }

        let mut matchups = archive::read_matchups(&snapshot.contents)?;
        let matched = merge::merge_market_odds(&mut matchups, &market_odds);
        tracing::info!("🔗 Matched market odds for {}/{} matchups", matched, matchups.len());

        Ok(OddsMergeResult {
            market_odds,
            merged_matchups: Some(matchups),
            matched,
        })
    }

    async fn load(&self, result: OddsMergeResult) -> Result<String> {
        let archive_config = &self.config.archive;
        let now = self.clock.now();

        let odds_path = archive::snapshot_path(&archive_config.dir, &archive_config.odds_prefix, now);
        let bytes = archive::market_odds_to_csv(&result.market_odds)?;
        self.storage.write_file(&odds_path, &bytes).await?;
        tracing::debug!("Wrote {} market events to {}", result.market_odds.len(), odds_path);

        if let Some(matchups) = &result.merged_matchups {
            let merged_path = archive::snapshot_path(&archive_config.dir, &archive_config.matchup_prefix, now);
            let bytes = archive::matchups_to_csv(matchups)?;
            self.storage.write_file(&merged_path, &bytes).await?;
            tracing::info!("📝 Merged snapshot written to {}", merged_path);
        }

        Ok(odds_path)
    }
}
