//! Builds the HTML report from a matchup snapshot.

use crate::config::toml_config::ReportConfig;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

pub const ERROR_MESSAGE_CLASS: &str = "error-message";
pub const TIMESTAMP_MARKER: &str = "Last updated:";

/// 報表欄位（CSV 欄名, 顯示標題）
const DISPLAY_COLUMNS: [(&str, &str); 8] = [
    ("TournamentName", "Tournament"),
    ("Round", "Round"),
    ("Player1Name", "Player 1"),
    ("Player2Name", "Player 2"),
    ("Player1_Match_Prob", "P1 Prob"),
    ("Player2_Match_Prob", "P2 Prob"),
    ("Player1_Match_Odds", "P1 Odds"),
    ("Player2_Match_Odds", "P2 Odds"),
];

const MARKET_COLUMNS: [(&str, &str); 2] = [
    ("Player1_Market_Odds", "P1 Market"),
    ("Player2_Market_Odds", "P2 Market"),
];

const ROUND_ORDER: [&str; 11] = ["Q1", "Q2", "Q3", "R128", "R64", "R32", "R16", "RR", "QF", "SF", "F"];

const MISSING: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// 表格或取代表格的錯誤訊息
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome {
    Table(ReportTable),
    Message(String),
}

impl TableOutcome {
    pub fn to_html(&self) -> String {
        match self {
            TableOutcome::Table(table) => render_table(table),
            TableOutcome::Message(message) => error_panel(message),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            TableOutcome::Table(table) => table.rows.len(),
            TableOutcome::Message(_) => 0,
        }
    }
}

struct RowValues {
    tournament: Option<String>,
    round: Option<String>,
    cells: Vec<String>,
    has_market: bool,
}

fn parse_number(field: Option<&str>) -> Option<f64> {
    field
        .and_then(|f| f.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn text_or_missing(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

fn format_odds(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}", v))
}

/// 讀取快照並套用過濾、格式化與排序
pub fn build_table(contents: &[u8], file_label: &str) -> TableOutcome {
    if contents.iter().all(u8::is_ascii_whitespace) {
        return TableOutcome::Message(format!("Data file is empty: {}", file_label));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents);

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            tracing::error!("Failed to read CSV header of {}: {}", file_label, e);
            return TableOutcome::Message(format!("Data file is empty or invalid: {}", file_label));
        }
    };

    let mut records = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("⚠️ Skipping unreadable row {} in {}: {}", line + 1, file_label, e),
        }
    }

    if records.is_empty() {
        return TableOutcome::Message(format!("Data file '{}' contains no match data.", file_label));
    }
    tracing::info!("Read {} rows from {}", records.len(), file_label);

    let column = |name: &str| headers.iter().position(|h| h == name);
    let missing: Vec<&str> = DISPLAY_COLUMNS
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| column(*name).is_none())
        .collect();
    if !missing.is_empty() {
        return TableOutcome::Message(format!(
            "Data is missing columns needed for display: {}.",
            missing.join(", ")
        ));
    }

    let idx: Vec<usize> = DISPLAY_COLUMNS
        .iter()
        .filter_map(|(name, _)| column(*name))
        .collect();
    let market_idx: Vec<Option<usize>> = MARKET_COLUMNS.iter().map(|(name, _)| column(*name)).collect();

    let original_count = records.len();
    let mut rows: Vec<RowValues> = Vec::new();
    for record in &records {
        let (Some(p1), Some(p2)) = (
            parse_number(record.get(idx[4])),
            parse_number(record.get(idx[5])),
        ) else {
            continue;
        };
        // 0% / 100% 代表比賽已結束
        if [p1, p2].iter().any(|p| *p == 0.0 || *p == 100.0) {
            continue;
        }

        let tournament = text_or_missing(record.get(idx[0]));
        let round = text_or_missing(record.get(idx[1]));
        let market: Vec<Option<f64>> = market_idx
            .iter()
            .map(|i| i.and_then(|i| parse_number(record.get(i))))
            .collect();

        let cells = vec![
            tournament.clone().unwrap_or_else(|| MISSING.to_string()),
            round.clone().unwrap_or_else(|| MISSING.to_string()),
            text_or_missing(record.get(idx[2])).unwrap_or_else(|| MISSING.to_string()),
            text_or_missing(record.get(idx[3])).unwrap_or_else(|| MISSING.to_string()),
            format!("{:.1}%", p1),
            format!("{:.1}%", p2),
            format_odds(parse_number(record.get(idx[6]))),
            format_odds(parse_number(record.get(idx[7]))),
            format_odds(market[0]),
            format_odds(market[1]),
        ];

        rows.push(RowValues {
            tournament,
            round,
            cells,
            has_market: market.iter().any(Option::is_some),
        });
    }

    tracing::info!(
        "Filtered out {} rows (Prob = 0%, 100%, or missing). {} rows remain.",
        original_count - rows.len(),
        rows.len()
    );

    if rows.is_empty() {
        return TableOutcome::Message(
            "No upcoming matches found (all matches appear completed or have invalid data).".to_string(),
        );
    }

    rows.sort_by(|a, b| {
        cmp_missing_last(&a.tournament, &b.tournament, |x, y| x.cmp(y))
            .then_with(|| cmp_missing_last(&a.round, &b.round, round_cmp))
    });

    let show_market = rows.iter().any(|r| r.has_market);
    let width = if show_market {
        DISPLAY_COLUMNS.len() + MARKET_COLUMNS.len()
    } else {
        DISPLAY_COLUMNS.len()
    };

    let headers = DISPLAY_COLUMNS
        .iter()
        .chain(MARKET_COLUMNS.iter())
        .take(width)
        .map(|(_, title)| *title)
        .collect();
    let rows = rows
        .into_iter()
        .map(|mut r| {
            r.cells.truncate(width);
            r.cells
        })
        .collect();

    TableOutcome::Table(ReportTable { headers, rows })
}

fn cmp_missing_last<F>(a: &Option<String>, b: &Option<String>, cmp: F) -> Ordering
where
    F: Fn(&str, &str) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => cmp(a.as_str(), b.as_str()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 依網球賽程排序輪次；未知輪次排在已知輪次之後並按字母排序
pub fn round_cmp(a: &str, b: &str) -> Ordering {
    let rank = |round: &str| {
        ROUND_ORDER
            .iter()
            .position(|r| r.eq_ignore_ascii_case(round))
            .unwrap_or(ROUND_ORDER.len())
    };
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_table(table: &ReportTable) -> String {
    let mut html = String::from("<table border=\"0\" class=\"dataframe\">\n  <thead>\n    <tr style=\"text-align: right;\">\n");
    for header in &table.headers {
        html.push_str(&format!("      <th>{}</th>\n", escape_html(header)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in &table.rows {
        html.push_str("    <tr>\n");
        for cell in row {
            html.push_str(&format!("      <td>{}</td>\n", escape_html(cell)));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

/// 取代表格位置的錯誤訊息區塊
pub fn error_panel(message: &str) -> String {
    tracing::warn!("⚠️ Report table replaced by message: {}", message);
    format!(
        "<div class=\"{}\" style=\"padding: 20px;\">{} Check logs for details.</div>",
        ERROR_MESSAGE_CLASS,
        escape_html(message)
    )
}

pub fn timestamp_marker(now: DateTime<Utc>) -> String {
    format!("{} {}", TIMESTAMP_MARKER, now.format("%Y-%m-%d %H:%M:%S UTC"))
}

pub fn render_page(config: &ReportConfig, content_html: &str, marker: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        :root {{
            --primary-color: #0056b3;
            --secondary-color: #007bff;
            --light-gray: #f8f9fa;
            --medium-gray: #dee2e6;
            --dark-gray: #343a40;
            --white: #ffffff;
            --hover-color: #e9ecef;
            --shadow-color: rgba(0,0,0,0.06);
        }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
            line-height: 1.65;
            padding: 25px;
            max-width: 1150px;
            margin: 25px auto;
            background-color: var(--light-gray);
            color: var(--dark-gray);
        }}
        h1 {{
            color: var(--primary-color);
            border-bottom: 3px solid var(--primary-color);
            padding-bottom: 12px;
            margin-bottom: 30px;
            font-weight: 600;
        }}
        p {{ margin-bottom: 20px; }}
        .table-container {{
            overflow-x: auto;
            box-shadow: 0 4px 10px var(--shadow-color);
            border-radius: 6px;
            background-color: var(--white);
            border: 1px solid var(--medium-gray);
            min-height: 100px;
            margin-bottom: 20px;
        }}
        table.dataframe {{ width: 100%; border-collapse: collapse; margin: 0; }}
        table.dataframe th, table.dataframe td {{
            border: none;
            border-bottom: 1px solid var(--medium-gray);
            padding: 12px 14px;
            text-align: left;
            vertical-align: middle;
            white-space: nowrap;
        }}
        table.dataframe tbody tr:last-child td {{ border-bottom: none; }}
        table.dataframe td:nth-child(1) {{ white-space: normal; }}
        table.dataframe td:nth-child(3), table.dataframe td:nth-child(4) {{ white-space: normal; font-weight: 500; }}
        table.dataframe th:nth-child(n+5), table.dataframe td:nth-child(n+5) {{ text-align: right; }}
        table.dataframe thead th {{
            background-color: var(--secondary-color);
            color: var(--white);
            font-weight: 600;
            border-bottom: 2px solid var(--primary-color);
            position: sticky;
            top: 0;
            z-index: 1;
        }}
        table.dataframe tbody tr:nth-child(even) {{ background-color: var(--light-gray); }}
        table.dataframe tbody tr:hover {{ background-color: var(--hover-color); }}
        .last-updated {{
            margin-top: 30px;
            padding-top: 15px;
            border-top: 1px solid var(--medium-gray);
            font-size: 0.9em;
            color: #6c757d;
            text-align: center;
        }}
        .{error_class} {{ color: #dc3545; font-weight: bold; text-align: center; }}
        @media (max-width: 768px) {{
            body {{ padding: 15px; }}
            h1 {{ font-size: 1.5em; }}
            table.dataframe th, table.dataframe td {{ white-space: normal; padding: 10px 8px; font-size: 0.9em; }}
        }}
    </style>
</head>
<body>

    <h1>{heading}</h1>
    <p>{description}</p>

    <div class="table-container">
        {content}
    </div>

    <div class="last-updated">
        {marker}
    </div>

</body>
</html>
"#,
        title = escape_html(&config.title),
        heading = escape_html(&config.heading),
        description = escape_html(&config.description),
        error_class = ERROR_MESSAGE_CLASS,
        content = content_html,
        marker = escape_html(marker),
    )
}
