use serde::{Deserialize, Serialize};

/// 一場即將開打的對戰，含模型機率與換算後的十進位賠率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    #[serde(rename = "TournamentName")]
    pub tournament: String,
    #[serde(rename = "Round")]
    pub round: String,
    #[serde(rename = "Player1Name")]
    pub player1: String,
    #[serde(rename = "Player2Name")]
    pub player2: String,
    #[serde(rename = "Player1_Match_Prob")]
    pub player1_prob: Option<f64>,
    #[serde(rename = "Player2_Match_Prob")]
    pub player2_prob: Option<f64>,
    #[serde(rename = "Player1_Match_Odds")]
    pub player1_odds: Option<f64>,
    #[serde(rename = "Player2_Match_Odds")]
    pub player2_odds: Option<f64>,
    #[serde(rename = "Player1_Market_Odds", default)]
    pub player1_market_odds: Option<f64>,
    #[serde(rename = "Player2_Market_Odds", default)]
    pub player2_market_odds: Option<f64>,
}

impl MatchupRecord {
    /// 由機率（百分比）建立紀錄並計算模型賠率
    pub fn new(
        tournament: impl Into<String>,
        round: impl Into<String>,
        player1: impl Into<String>,
        player2: impl Into<String>,
        player1_prob: Option<f64>,
        player2_prob: Option<f64>,
    ) -> Self {
        Self {
            tournament: tournament.into(),
            round: round.into(),
            player1: player1.into(),
            player2: player2.into(),
            player1_prob,
            player2_prob,
            player1_odds: player1_prob.and_then(decimal_odds),
            player2_odds: player2_prob.and_then(decimal_odds),
            player1_market_odds: None,
            player2_market_odds: None,
        }
    }

    pub fn has_market_odds(&self) -> bool {
        self.player1_market_odds.is_some() || self.player2_market_odds.is_some()
    }
}

/// 百分比機率換算十進位賠率；0 與 100 代表比賽已結束，沒有賠率
pub fn decimal_odds(prob_percent: f64) -> Option<f64> {
    if prob_percent.is_finite() && prob_percent > 0.0 && prob_percent < 100.0 {
        Some(round2(100.0 / prob_percent))
    } else {
        None
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 博彩網站上的一場對戰賠率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOdds {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Player1Name")]
    pub player1: String,
    #[serde(rename = "Player2Name")]
    pub player2: String,
    #[serde(rename = "Player1_Odds")]
    pub player1_odds: f64,
    #[serde(rename = "Player2_Odds")]
    pub player2_odds: f64,
}

/// 賠率步驟的轉換結果
#[derive(Debug, Clone, Default)]
pub struct OddsMergeResult {
    pub market_odds: Vec<MarketOdds>,
    /// 沒有任何對戰快照時為 None
    pub merged_matchups: Option<Vec<MatchupRecord>>,
    pub matched: usize,
}

/// 讀回的快照檔
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: String,
    pub contents: Vec<u8>,
}

/// 產生好的報表頁面
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub timestamp_marker: String,
    pub rows_rendered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_odds_from_percentages() {
        assert_eq!(decimal_odds(50.0), Some(2.0));
        assert_eq!(decimal_odds(80.0), Some(1.25));
        assert_eq!(decimal_odds(33.3), Some(3.0));
        assert_eq!(decimal_odds(0.0), None);
        assert_eq!(decimal_odds(100.0), None);
        assert_eq!(decimal_odds(f64::NAN), None);
    }

    #[test]
    fn test_new_record_computes_model_odds() {
        let record = MatchupRecord::new("Paris", "R32", "Jannik Sinner", "Tommy Paul", Some(75.0), Some(25.0));
        assert_eq!(record.player1_odds, Some(1.33));
        assert_eq!(record.player2_odds, Some(4.0));
        assert!(!record.has_market_odds());
    }
}
