pub mod matchup_pipeline;
pub mod odds_pipeline;
pub mod page_pipeline;

pub use matchup_pipeline::MatchupPipeline;
pub use odds_pipeline::OddsPipeline;
pub use page_pipeline::PagePipeline;

use chrono::{DateTime, Utc};

/// 快照檔名與頁面時間戳使用的時鐘；測試時可固定
#[derive(Debug, Clone, Copy, Default)]
pub struct RunClock {
    fixed: Option<DateTime<Utc>>,
}

impl RunClock {
    pub fn system() -> Self {
        Self { fixed: None }
    }

    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self { fixed: Some(at) }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed.unwrap_or_else(Utc::now)
    }
}
