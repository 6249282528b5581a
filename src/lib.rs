pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod scrape;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{Fetcher, HttpFetcher, LocalStorage};
pub use app::pipelines::{MatchupPipeline, OddsPipeline, PagePipeline, RunClock};
pub use app::Runner;
pub use config::toml_config::AppConfig;
pub use core::etl::EtlEngine;
pub use utils::error::{EtlError, Result};
