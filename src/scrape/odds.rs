//! Bookmaker odds parsing (HTML tables or JSON feeds).

use crate::config::toml_config::{HtmlOddsLayout, JsonOddsLayout, OddsFormat, OddsSource};
use crate::domain::model::{round2, MarketOdds};
use crate::scrape::sanitize::clean_player_name;
use crate::scrape::{cell_texts, selector};
use crate::utils::error::{EtlError, Result};
use scraper::Html;
use serde_json::Value;

/// 將賠率文字轉為十進位賠率
///
/// 支援十進位 (`1.85`)、分數 (`5/2`)、平賠 (`EVS`) 與美式 (`+150`, `-200`)。
/// 只有大於 1.0 的賠率有效。
pub fn parse_odds_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let decimal = if text.eq_ignore_ascii_case("evs") || text.eq_ignore_ascii_case("evens") {
        2.0
    } else if let Some((num, den)) = text.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        1.0 + num / den
    } else if text.starts_with('+') || text.starts_with('-') {
        let american: f64 = text.parse().ok()?;
        if american >= 100.0 {
            1.0 + american / 100.0
        } else if american <= -100.0 {
            1.0 + 100.0 / american.abs()
        } else {
            return None;
        }
    } else {
        text.replace(',', ".").parse().ok()?
    };

    // 四捨五入後仍須大於 1.0
    Some(round2(decimal)).filter(|odds| odds.is_finite() && *odds > 1.0)
}

pub struct OddsParser;

impl OddsParser {
    pub fn parse(body: &str, source: &OddsSource) -> Result<Vec<MarketOdds>> {
        match source.format {
            OddsFormat::Html => Self::parse_html(body, &source.name, &source.html),
            OddsFormat::Json => Self::parse_json(body, &source.name, &source.json),
        }
    }

    pub fn parse_html(html: &str, source_name: &str, layout: &HtmlOddsLayout) -> Result<Vec<MarketOdds>> {
        let document = Html::parse_document(html);
        let row_selector = selector(&layout.row_selector)?;
        let cell_selector = selector(&layout.cell_selector)?;
        let required = layout.required_cells();

        let mut events = Vec::new();
        for row in document.select(&row_selector) {
            let cells = cell_texts(row, &cell_selector);
            if cells.len() < required {
                continue;
            }
            if let Some(event) = build_event(
                source_name,
                &cells[layout.player1_column],
                &cells[layout.player2_column],
                parse_odds_text(&cells[layout.player1_odds_column]),
                parse_odds_text(&cells[layout.player2_odds_column]),
            ) {
                events.push(event);
            }
        }
        Ok(events)
    }

    pub fn parse_json(body: &str, source_name: &str, layout: &JsonOddsLayout) -> Result<Vec<MarketOdds>> {
        let root: Value = serde_json::from_str(body)?;
        let items = root
            .pointer(&layout.events_pointer)
            .and_then(Value::as_array)
            .ok_or_else(|| EtlError::ParseError {
                page: source_name.to_string(),
                message: format!("no event array at JSON pointer '{}'", layout.events_pointer),
            })?;

        let events = items
            .iter()
            .filter_map(|item| {
                build_event(
                    source_name,
                    item.get(&layout.player1_field).and_then(Value::as_str).unwrap_or(""),
                    item.get(&layout.player2_field).and_then(Value::as_str).unwrap_or(""),
                    item.get(&layout.player1_odds_field).and_then(json_odds),
                    item.get(&layout.player2_odds_field).and_then(json_odds),
                )
            })
            .collect();
        Ok(events)
    }
}

fn json_odds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().map(round2).filter(|v| *v > 1.0),
        Value::String(s) => parse_odds_text(s),
        _ => None,
    }
}

fn build_event(
    source_name: &str,
    player1: &str,
    player2: &str,
    player1_odds: Option<f64>,
    player2_odds: Option<f64>,
) -> Option<MarketOdds> {
    let player1 = clean_player_name(player1);
    let player2 = clean_player_name(player2);
    if player1.is_empty() || player2.is_empty() {
        return None;
    }
    match (player1_odds, player2_odds) {
        (Some(player1_odds), Some(player2_odds)) => Some(MarketOdds {
            source: source_name.to_string(),
            player1,
            player2,
            player1_odds,
            player2_odds,
        }),
        _ => {
            tracing::debug!("{}: skipping {} vs {} without usable odds", source_name, player1, player2);
            None
        }
    }
}
