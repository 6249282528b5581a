use crate::app::pipelines::RunClock;
use crate::config::toml_config::AppConfig;
use crate::core::{archive, MatchupRecord, PageFetcher, Pipeline, Storage};
use crate::scrape::MatchupParser;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::collections::HashSet;

/// 步驟 1：抓取各賽事的模型對戰機率並寫入快照
pub struct MatchupPipeline<S: Storage, F: PageFetcher> {
    storage: S,
    fetcher: F,
    config: AppConfig,
    clock: RunClock,
}

impl<S: Storage, F: PageFetcher> MatchupPipeline<S, F> {
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

    async fn scrape_source(&self, url: &str, tournament: Option<&str>) -> Result<Vec<MatchupRecord>> {
        let html = self.fetcher.fetch(url).await?;
        MatchupParser::parse(&html, tournament, &self.config.matchups.layout)
    }
}

#[async_trait]
impl<S: Storage, F: PageFetcher> Pipeline for MatchupPipeline<S, F> {
    type Extracted = Vec<MatchupRecord>;
    type Transformed = Vec<MatchupRecord>;

    fn name(&self) -> &str {
        "matchup scrape"
    }

    async fn extract(&self) -> Result<Vec<MatchupRecord>> {
        let sources = &self.config.matchups.sources;
        if sources.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "matchups.sources".to_string(),
            });
        }

        let mut records = Vec::new();
        let mut failures = 0usize;

        for (i, source) in sources.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.fetch.request_delay()).await;
            }

            match self.scrape_source(&source.url, source.tournament.as_deref()).await {
                Ok(found) => {
                    tracing::info!("🎾 {} matchups from {}", found.len(), source.url);
                    records.extend(found);
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!("⚠️ Skipping {}: {}", source.url, e);
                }
            }
        }

        if failures == sources.len() {
            return Err(EtlError::ProcessingError {
                message: format!("all {} matchup sources failed", failures),
            });
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<MatchupRecord>) -> Result<Vec<MatchupRecord>> {
        // 多個來源可能列出同一場比賽，保留第一筆
        let mut seen = HashSet::new();
        let total = data.len();
        let records: Vec<MatchupRecord> = data
            .into_iter()
            .filter(|r| {
                seen.insert((
                    r.tournament.clone(),
                    r.round.clone(),
                    r.player1.clone(),
                    r.player2.clone(),
                ))
            })
            .collect();

        if records.len() < total {
            tracing::debug!("Dropped {} duplicate matchups", total - records.len());
        }
        if records.is_empty() {
            tracing::warn!("⚠️ No matchups found; writing a header-only snapshot");
        }
        Ok(records)
    }

    async fn load(&self, records: Vec<MatchupRecord>) -> Result<String> {
        let archive_config = &self.config.archive;
        let path = archive::snapshot_path(&archive_config.dir, &archive_config.matchup_prefix, self.clock.now());
        let bytes = archive::matchups_to_csv(&records)?;

        tracing::debug!("Writing {} matchups ({} bytes) to {}", records.len(), bytes.len(), path);
        self.storage.write_file(&path, &bytes).await?;
        Ok(path)
    }
}
