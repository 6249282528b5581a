use crate::app::pipelines::RunClock;
use crate::config::toml_config::AppConfig;
use crate::core::report::{self, TableOutcome};
use crate::core::{archive, Pipeline, RenderedPage, Snapshot, Storage};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;

/// 步驟 3：以最新的對戰快照產生靜態 HTML 報表
pub struct PagePipeline<S: Storage> {
    storage: S,
    config: AppConfig,
    clock: RunClock,
}

impl<S: Storage> PagePipeline<S> {
    pub fn new(storage: S, config: AppConfig) -> Self {
        Self {
            storage,
            config,
            clock: RunClock::system(),
        }
    }

    pub fn with_clock(mut self, clock: RunClock) -> Self {
        self.clock = clock;
        self
    }

    fn missing_snapshot_message(&self) -> String {
        format!(
            "Could not find latest data file ({}_*.csv) in {}.",
            self.config.archive.matchup_prefix, self.config.archive.dir
        )
    }

    /// 讀回剛寫入的頁面確認內容
    async fn verify(&self, path: &str, marker: &str) -> Result<()> {
        if !self.storage.exists(path).await {
            return Err(EtlError::ArtifactMissing {
                path: path.to_string(),
            });
        }
        let written = self.storage.read_file(path).await?;
        let html = String::from_utf8_lossy(&written);
        if html.contains(marker) {
            tracing::info!("🔍 Verified {} ({} bytes)", path, written.len());
        } else {
            tracing::warn!("⚠️ {} does not contain the expected '{}' marker", path, marker);
        }
        Ok(())
    }
}

#[async_trait]
impl<S: Storage> Pipeline for PagePipeline<S> {
    type Extracted = Option<Snapshot>;
    type Transformed = RenderedPage;

    fn name(&self) -> &str {
        "page generation"
    }

    async fn extract(&self) -> Result<Option<Snapshot>> {
        let archive_config = &self.config.archive;
        archive::load_latest(&self.storage, &archive_config.dir, &archive_config.matchup_prefix).await
    }

    async fn transform(&self, snapshot: Option<Snapshot>) -> Result<RenderedPage> {
        let outcome = match &snapshot {
            Some(snapshot) => report::build_table(&snapshot.contents, &snapshot.path),
            None => TableOutcome::Message(self.missing_snapshot_message()),
        };

        let marker = report::timestamp_marker(self.clock.now());
        let html = report::render_page(&self.config.report, &outcome.to_html(), &marker);
        tracing::info!("📊 Rendered {} rows", outcome.row_count());

        Ok(RenderedPage {
            html,
            timestamp_marker: marker,
            rows_rendered: outcome.row_count(),
        })
    }

    async fn load(&self, page: RenderedPage) -> Result<String> {
        let path = self.config.report.output_file.clone();
        self.storage.write_file(&path, page.html.as_bytes()).await?;
        self.verify(&path, report::TIMESTAMP_MARKER).await?;
        Ok(path)
    }
}
