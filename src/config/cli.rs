use crate::config::toml_config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use clap::Args;
use std::path::{Path, PathBuf};

/// 所有執行檔共用的命令列參數
#[derive(Debug, Clone, Args)]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults to tennis-odds.toml in the root directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory that holds the archive and the generated page
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines (for CI log collectors)
    #[arg(long)]
    pub log_json: bool,

    /// Log CPU and memory usage after each phase
    #[arg(long)]
    pub monitor: bool,

    /// Show what would be processed without fetching or writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None => self.root.join(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load(&self.config_path(), self.config.is_some())
    }

    pub fn root_str(&self) -> String {
        path_to_string(&self.root)
    }

    /// 載入並驗證配置；`--dry-run` 時印出摘要後回傳 None
    pub fn prepare(&self) -> Result<Option<AppConfig>> {
        tracing::info!("📁 Loading configuration from: {}", self.config_path().display());
        let config = self.load_config()?;
        config.validate()?;
        tracing::info!("✅ Configuration loaded and validated successfully");

        if self.verbose || self.dry_run {
            display_config_summary(&config, self);
        }
        if self.dry_run {
            tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
            return Ok(None);
        }
        if self.monitor {
            tracing::info!("🔍 System monitoring enabled");
        }
        Ok(Some(config))
    }
}

/// 記錄並印出錯誤，回傳對應的退出碼
pub fn report_failure(e: &EtlError) -> i32 {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    e.severity().exit_code()
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// 印出配置摘要（`--dry-run` 與 verbose 模式使用）
pub fn display_config_summary(config: &AppConfig, args: &CliArgs) {
    println!("📋 Configuration Summary:");
    println!("  Root: {}", args.root.display());
    println!("  Config: {}", args.config_path().display());
    println!("  Archive: {}", config.archive.dir);
    println!(
        "  Snapshots: {}_*.csv / {}_*.csv",
        config.archive.matchup_prefix, config.archive.odds_prefix
    );
    println!("  Fetch mode: {:?}", config.fetch.mode);
    println!("  Matchup sources: {}", config.matchups.sources.len());
    for source in &config.matchups.sources {
        println!(
            "    - {} ({})",
            source.url,
            source.tournament.as_deref().unwrap_or("tournament from page")
        );
    }
    if config.odds_enabled() {
        println!("  Odds sources: {}", config.odds.sources.len());
        for source in &config.odds.sources {
            println!("    - {} [{:?}] {}", source.name, source.format, source.url);
        }
    } else {
        println!("  Odds sources: disabled");
    }
    println!("  Report: {}", config.report.output_file);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        cli: CliArgs,
    }

    #[test]
    fn test_config_path_defaults_to_root() {
        let parsed = TestCli::parse_from(["tennis-odds", "--root", "/srv/odds", "--dry-run"]);
        assert_eq!(parsed.cli.config_path(), PathBuf::from("/srv/odds/tennis-odds.toml"));
        assert!(parsed.cli.dry_run);
        assert!(!parsed.cli.log_json);
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let parsed = TestCli::parse_from(["tennis-odds", "--config", missing.to_str().unwrap()]);
        assert!(parsed.cli.load_config().is_err());
    }

    #[test]
    fn test_dry_run_stops_after_validation() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = TestCli::parse_from(["tennis-odds", "--root", dir.path().to_str().unwrap(), "--dry-run"]);
        assert!(parsed.cli.prepare().unwrap().is_none());

        let parsed = TestCli::parse_from(["tennis-odds", "--root", dir.path().to_str().unwrap()]);
        assert!(parsed.cli.prepare().unwrap().is_some());
    }

    #[test]
    fn test_failure_exit_codes() {
        let missing = EtlError::ArtifactMissing {
            path: "index.html".to_string(),
        };
        assert_eq!(report_failure(&missing), 3);

        let config = EtlError::MissingConfigError {
            field: "matchups.sources".to_string(),
        };
        assert_eq!(report_failure(&config), 1);
    }
}
