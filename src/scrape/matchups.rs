//! Parser for Tennis Abstract (Sackmann model) upcoming-match tables.

use crate::config::toml_config::MatchupLayout;
use crate::domain::model::MatchupRecord;
use crate::scrape::sanitize::{clean_player_name, normalize_ws, parse_probability};
use crate::scrape::{cell_texts, selector};
use crate::utils::error::{EtlError, Result};
use scraper::Html;

pub struct MatchupParser;

impl MatchupParser {
    /// 解析一個賽事頁面；`tournament` 為 None 時從頁面標題取得賽事名稱
    pub fn parse(html: &str, tournament: Option<&str>, layout: &MatchupLayout) -> Result<Vec<MatchupRecord>> {
        let document = Html::parse_document(html);
        let tournament = match tournament {
            Some(name) => name.to_string(),
            None => Self::parse_tournament(&document, layout)?,
        };

        let row_selector = selector(&layout.row_selector)?;
        let cell_selector = selector(&layout.cell_selector)?;
        let required = layout.required_cells();

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for row in document.select(&row_selector) {
            let cells = cell_texts(row, &cell_selector);
            if cells.len() < required {
                // 表頭或分隔列
                skipped += 1;
                continue;
            }

            let player1 = clean_player_name(&cells[layout.player1_column]);
            let player2 = clean_player_name(&cells[layout.player2_column]);
            if player1.is_empty() || player2.is_empty() {
                skipped += 1;
                continue;
            }

            let as_fraction = layout.probabilities_as_fraction;
            records.push(MatchupRecord::new(
                tournament.clone(),
                normalize_ws(&cells[layout.round_column]),
                player1,
                player2,
                parse_probability(&cells[layout.player1_prob_column], as_fraction),
                parse_probability(&cells[layout.player2_prob_column], as_fraction),
            ));
        }

        tracing::debug!(
            "{}: parsed {} matchups, skipped {} rows",
            tournament,
            records.len(),
            skipped
        );
        Ok(records)
    }

    fn parse_tournament(document: &Html, layout: &MatchupLayout) -> Result<String> {
        let missing = || EtlError::ParseError {
            page: "tournament page".to_string(),
            message: "tournament name not found; set `tournament` on the source".to_string(),
        };

        let css = layout.tournament_selector.as_deref().ok_or_else(missing)?;
        let heading = selector(css)?;
        document
            .select(&heading)
            .map(|elem| normalize_ws(&elem.text().collect::<String>()))
            .find(|name| !name.is_empty())
            .ok_or_else(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
  <h1> Paris Masters  </h1>
  <table id="upcoming">
    <tr><th>Round</th><th>Player 1</th><th>Player 2</th><th>P1</th><th>P2</th></tr>
    <tr><td>R32</td><td>Jannik Sinner (1)</td><td>Tommy Paul [USA]</td><td>78.3%</td><td>21.7%</td></tr>
    <tr><td>R32</td><td>Arthur Fils</td><td>Ben Shelton</td><td>100%</td><td>0%</td></tr>
    <tr><td colspan="5">Day 2</td></tr>
    <tr><td>R16</td><td></td><td>TBD</td><td>-</td><td>-</td></tr>
    <tr><td>R16</td><td>Casper Ruud</td><td>Holger Rune</td><td>n/a</td><td>48.0%</td></tr>
  </table>
</body></html>"#;

    #[test]
    fn test_parse_upcoming_table() {
        let records = MatchupParser::parse(PAGE, None, &MatchupLayout::default()).unwrap();

        assert_eq!(records.len(), 3);
        let first = &records[0];
        assert_eq!(first.tournament, "Paris Masters");
        assert_eq!(first.round, "R32");
        assert_eq!(first.player1, "Jannik Sinner");
        assert_eq!(first.player2, "Tommy Paul");
        assert_eq!(first.player1_prob, Some(78.3));
        assert_eq!(first.player1_odds, Some(1.28));
        assert_eq!(first.player2_odds, Some(4.61));

        // 已完賽的對戰保留在快照中，由報表過濾
        assert_eq!(records[1].player1_prob, Some(100.0));
        assert_eq!(records[1].player1_odds, None);

        assert_eq!(records[2].player1_prob, None);
        assert_eq!(records[2].player2_prob, Some(48.0));
    }

    #[test]
    fn test_configured_tournament_wins_over_heading() {
        let records = MatchupParser::parse(PAGE, Some("Rolex Paris Masters"), &MatchupLayout::default()).unwrap();
        assert!(records.iter().all(|r| r.tournament == "Rolex Paris Masters"));
    }

    #[test]
    fn test_missing_tournament_is_an_error() {
        let layout = MatchupLayout {
            tournament_selector: Some("h2.event".to_string()),
            ..MatchupLayout::default()
        };
        assert!(matches!(
            MatchupParser::parse(PAGE, None, &layout),
            Err(EtlError::ParseError { .. })
        ));
    }

    #[test]
    fn test_page_without_table_yields_nothing() {
        let records = MatchupParser::parse("<h1>Paris</h1><p>No matches today</p>", None, &MatchupLayout::default())
            .unwrap();
        assert!(records.is_empty());
    }
}
