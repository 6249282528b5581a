pub mod archive;
pub mod etl;
pub mod merge;
pub mod report;

pub use crate::domain::model::{MarketOdds, MatchupRecord, OddsMergeResult, RenderedPage, Snapshot};
pub use crate::domain::ports::{PageFetcher, Pipeline, Storage, StoredFile};
pub use crate::utils::error::Result;
