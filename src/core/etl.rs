use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        let name = self.pipeline.name();
        tracing::info!("🚀 Starting {}", name);

        tracing::info!("📥 {}: extracting...", name);
        let extracted = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        tracing::info!("🔄 {}: transforming...", name);
        let transformed = self.pipeline.transform(extracted).await?;
        self.monitor.log_stats("Transform");

        tracing::info!("💾 {}: loading...", name);
        let output_path = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");

        tracing::info!("✅ {} completed, output: {}", name, output_path);
        self.monitor.log_final_stats();
        Ok(output_path)
    }

    /// 失敗時只記錄警告，讓後續步驟繼續執行
    pub async fn run_best_effort(&self) -> Option<String> {
        match self.run().await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(
                    "⚠️ {} failed, continuing without it: {} (Category: {:?})",
                    self.pipeline.name(),
                    e,
                    e.category()
                );
                tracing::warn!("💡 {}", e.recovery_suggestion());
                None
            }
        }
    }
}
