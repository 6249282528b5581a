use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "tennis-odds.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub archive: ArchiveConfig,
    pub fetch: FetchConfig,
    pub matchups: MatchupsConfig,
    pub odds: OddsConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub dir: String,
    pub matchup_prefix: String,
    pub odds_prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            dir: "data_archive".to_string(),
            matchup_prefix: "sackmann_matchups".to_string(),
            odds_prefix: "market_odds".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Http,
    Browser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub mode: FetchMode,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    /// 同一來源連續請求間的間隔
    pub request_delay_ms: u64,
    pub user_agent: String,
    /// browser 模式：等待此 selector 出現後才讀取頁面
    pub wait_selector: Option<String>,
    pub browser_wait_ms: u64,
    pub chrome_executable: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Http,
            timeout_seconds: 30,
            retry_attempts: 2,
            retry_delay_seconds: 5,
            request_delay_ms: 1500,
            user_agent: format!("tennis-odds/{}", env!("CARGO_PKG_VERSION")),
            wait_selector: None,
            browser_wait_ms: 3000,
            chrome_executable: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_config(&self) -> crate::utils::retry::RetryConfig {
        crate::utils::retry::RetryConfig::new(
            self.retry_attempts,
            Duration::from_secs(self.retry_delay_seconds),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchupsConfig {
    pub sources: Vec<MatchupSource>,
    pub layout: MatchupLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupSource {
    pub url: String,
    /// 未設定時從頁面的 `layout.tournament_selector` 取得
    pub tournament: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchupLayout {
    pub row_selector: String,
    pub cell_selector: String,
    pub tournament_selector: Option<String>,
    pub round_column: usize,
    pub player1_column: usize,
    pub player2_column: usize,
    pub player1_prob_column: usize,
    pub player2_prob_column: usize,
    /// 機率以 0..1 表示而非百分比
    pub probabilities_as_fraction: bool,
}

impl Default for MatchupLayout {
    fn default() -> Self {
        Self {
            row_selector: "table#upcoming tr".to_string(),
            cell_selector: "td".to_string(),
            tournament_selector: Some("h1".to_string()),
            round_column: 0,
            player1_column: 1,
            player2_column: 2,
            player1_prob_column: 3,
            player2_prob_column: 4,
            probabilities_as_fraction: false,
        }
    }
}

impl MatchupLayout {
    pub fn required_cells(&self) -> usize {
        [
            self.round_column,
            self.player1_column,
            self.player2_column,
            self.player1_prob_column,
            self.player2_prob_column,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsConfig {
    pub enabled: bool,
    pub sources: Vec<OddsSource>,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsSource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub format: OddsFormat,
    #[serde(default)]
    pub html: HtmlOddsLayout,
    #[serde(default)]
    pub json: JsonOddsLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlOddsLayout {
    pub row_selector: String,
    pub cell_selector: String,
    pub player1_column: usize,
    pub player2_column: usize,
    pub player1_odds_column: usize,
    pub player2_odds_column: usize,
}

impl Default for HtmlOddsLayout {
    fn default() -> Self {
        Self {
            row_selector: "table.odds tr".to_string(),
            cell_selector: "td".to_string(),
            player1_column: 0,
            player2_column: 1,
            player1_odds_column: 2,
            player2_odds_column: 3,
        }
    }
}

impl HtmlOddsLayout {
    pub fn required_cells(&self) -> usize {
        [
            self.player1_column,
            self.player2_column,
            self.player1_odds_column,
            self.player2_odds_column,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOddsLayout {
    /// JSON pointer（RFC 6901）指向事件陣列；空字串代表根節點
    pub events_pointer: String,
    pub player1_field: String,
    pub player2_field: String,
    pub player1_odds_field: String,
    pub player2_odds_field: String,
}

impl Default for JsonOddsLayout {
    fn default() -> Self {
        Self {
            events_pointer: "/events".to_string(),
            player1_field: "home".to_string(),
            player2_field: "away".to_string(),
            player1_odds_field: "home_odds".to_string(),
            player2_odds_field: "away_odds".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_file: String,
    pub title: String,
    pub heading: String,
    pub description: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_file: "index.html".to_string(),
            title: "Upcoming Tennis Odds (Sackmann Model)".to_string(),
            heading: "Upcoming Tennis Match Odds (Sackmann Model)".to_string(),
            description: "Probabilities and implied decimal odds for upcoming ATP and Challenger matches, \
                          based on the Tennis Abstract (Sackmann) model ratings."
                .to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 載入配置；檔案不存在且不是使用者指定的路徑時使用內建預設值
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            tracing::info!(
                "📁 No config file at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ODDS_API_KEY})；未定義的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn odds_enabled(&self) -> bool {
        self.odds.enabled && !self.odds.sources.is_empty()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("archive.dir", &self.archive.dir)?;
        validation::validate_file_prefix("archive.matchup_prefix", &self.archive.matchup_prefix)?;
        validation::validate_file_prefix("archive.odds_prefix", &self.archive.odds_prefix)?;
        if prefixes_overlap(&self.archive.matchup_prefix, &self.archive.odds_prefix) {
            return Err(EtlError::ConfigValidationError {
                field: "archive.odds_prefix".to_string(),
                message: "must differ from archive.matchup_prefix and not extend it with '_'".to_string(),
            });
        }

        validation::validate_range("fetch.timeout_seconds", self.fetch.timeout_seconds, 1, 600)?;
        validation::validate_range("fetch.retry_attempts", self.fetch.retry_attempts, 0, 10)?;
        validation::validate_non_empty_string("fetch.user_agent", &self.fetch.user_agent)?;
        if let Some(selector) = &self.fetch.wait_selector {
            validation::validate_selector("fetch.wait_selector", selector)?;
        }

        for (i, source) in self.matchups.sources.iter().enumerate() {
            validation::validate_url(&format!("matchups.sources[{}].url", i), &source.url)?;
        }
        let layout = &self.matchups.layout;
        validation::validate_selector("matchups.layout.row_selector", &layout.row_selector)?;
        validation::validate_selector("matchups.layout.cell_selector", &layout.cell_selector)?;
        if let Some(selector) = &layout.tournament_selector {
            validation::validate_selector("matchups.layout.tournament_selector", selector)?;
        }
        if self
            .matchups
            .sources
            .iter()
            .any(|s| s.tournament.is_none())
            && layout.tournament_selector.is_none()
        {
            return Err(EtlError::MissingConfigError {
                field: "matchups.layout.tournament_selector".to_string(),
            });
        }

        validation::validate_path("report.output_file", &self.report.output_file)?;
        Ok(())
    }
}

/// `a_*.csv` 的檔名也會符合 `b_*.csv` 的前綴比對時視為重疊
fn prefixes_overlap(a: &str, b: &str) -> bool {
    let extends = |long: &str, short: &str| {
        long.strip_prefix(short)
            .is_some_and(|rest| rest.starts_with('_'))
    };
    a == b || extends(a, b) || extends(b, a)
}

/// 賠率來源在賠率步驟中才驗證，失敗只影響該來源
impl OddsSource {
    pub fn validate_at(&self, index: usize) -> Result<()> {
        let prefix = format!("odds.sources[{}]", index);
        validation::validate_non_empty_string(&format!("{}.name", prefix), &self.name)?;
        validation::validate_url(&format!("{}.url", prefix), &self.url)?;
        match self.format {
            OddsFormat::Html => {
                validation::validate_selector(&format!("{}.html.row_selector", prefix), &self.html.row_selector)?;
                validation::validate_selector(&format!("{}.html.cell_selector", prefix), &self.html.cell_selector)?;
            }
            OddsFormat::Json => {
                let json = &self.json;
                if !json.events_pointer.is_empty() && !json.events_pointer.starts_with('/') {
                    return Err(EtlError::InvalidConfigValueError {
                        field: format!("{}.json.events_pointer", prefix),
                        value: json.events_pointer.clone(),
                        reason: "JSON pointer must be empty or start with '/'".to_string(),
                    });
                }
                for (field, value) in [
                    ("player1_field", &json.player1_field),
                    ("player2_field", &json.player2_field),
                    ("player1_odds_field", &json.player1_odds_field),
                    ("player2_odds_field", &json.player2_odds_field),
                ] {
                    validation::validate_non_empty_string(&format!("{}.json.{}", prefix, field), value)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[archive]
dir = "data_archive"

[fetch]
mode = "browser"
timeout_seconds = 45
wait_selector = "table#upcoming"

[[matchups.sources]]
url = "https://tennisabstract.com/current/ParisMasters.html"
tournament = "Paris Masters"

[matchups.layout]
row_selector = "table#upcoming tbody tr"
player1_prob_column = 4
player2_prob_column = 5

[[odds.sources]]
name = "exchange"
url = "https://odds.example.com/api/tennis?key=${TENNIS_ODDS_TEST_KEY}"
format = "json"

[odds.sources.json]
events_pointer = "/data/events"
"#;

    #[test]
    fn test_parse_full_config() {
        std::env::set_var("TENNIS_ODDS_TEST_KEY", "secret");
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.fetch.mode, FetchMode::Browser);
        assert_eq!(config.fetch.timeout_seconds, 45);
        assert_eq!(config.fetch.retry_attempts, 2);
        assert_eq!(config.matchups.sources.len(), 1);
        assert_eq!(config.matchups.layout.player1_prob_column, 4);
        assert_eq!(config.matchups.layout.required_cells(), 6);
        assert_eq!(config.odds.sources[0].format, OddsFormat::Json);
        assert_eq!(config.odds.sources[0].json.events_pointer, "/data/events");
        assert_eq!(config.odds.sources[0].json.player1_field, "home");
        assert!(config.odds.sources[0].url.ends_with("key=secret"));
        assert_eq!(config.report.output_file, "index.html");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_env_var_is_left_untouched() {
        let content = "[report]\ntitle = \"${TENNIS_ODDS_SURELY_UNSET_VAR}\"\n";
        let config = AppConfig::from_toml_str(content).unwrap();
        assert_eq!(config.report.title, "${TENNIS_ODDS_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.odds_enabled());
        assert_eq!(config.archive.matchup_prefix, "sackmann_matchups");
    }

    #[test]
    fn test_rejects_bad_selector_and_same_prefixes() {
        let mut config = AppConfig::default();
        config.matchups.layout.row_selector = "tr[".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.archive.odds_prefix = config.archive.matchup_prefix.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_prefix_that_extends_the_other() {
        let mut config = AppConfig::default();
        config.archive.matchup_prefix = "market".to_string();
        config.archive.odds_prefix = "market_odds".to_string();
        assert!(config.validate().is_err());

        config.archive.matchup_prefix = "market_odds".to_string();
        config.archive.odds_prefix = "market".to_string();
        assert!(config.validate().is_err());

        // 只共用開頭字母不算重疊
        config.archive.matchup_prefix = "marketodds".to_string();
        config.archive.odds_prefix = "market".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unresolved_odds_url_does_not_block_global_validation() {
        let content = "[odds]\nenabled = false\n\n[[odds.sources]]\nname = \"bookmaker\"\nurl = \"${TENNIS_ODDS_UNSET_FEED_URL}\"\nformat = \"json\"\n";
        let config = AppConfig::from_toml_str(content).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.odds_enabled());
        assert!(matches!(
            config.odds.sources[0].validate_at(0),
            Err(EtlError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = AppConfig::from_toml_str(include_str!("../../tennis-odds.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.matchups.sources.len(), 1);
        assert!(!config.odds_enabled());
    }

    #[test]
    fn test_missing_default_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tennis-odds.toml");
        assert!(AppConfig::load(&path, false).is_ok());
        assert!(AppConfig::load(&path, true).is_err());
    }
}
