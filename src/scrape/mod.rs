//! HTML / JSON parsing for the matchup and odds sources.

pub mod matchups;
pub mod odds;
pub mod sanitize;

pub use matchups::MatchupParser;
pub use odds::{parse_odds_text, OddsParser};

use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Selector};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::ParseError {
        page: format!("selector `{}`", css),
        message: e.to_string(),
    })
}

/// 取出一列中每個儲存格的文字（已壓縮空白）
pub(crate) fn cell_texts(row: ElementRef<'_>, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|cell| sanitize::normalize_ws(&cell.text().collect::<String>()))
        .collect()
}
