//! Text cleanup for scraped table cells.

/// 連續空白壓成一個空格並去除首尾空白
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// 移除 `(...)` 與 `[...]` 標記，例如種子序號、國籍、`[WC]`
pub fn strip_annotations(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

pub fn clean_player_name(s: &str) -> String {
    normalize_ws(&strip_annotations(s))
}

/// 解析機率欄位，回傳百分比；無法解析或超出 0..=100 時回傳 None
pub fn parse_probability(text: &str, as_fraction: bool) -> Option<f64> {
    let trimmed = text.trim();
    let has_percent = trimmed.ends_with('%');
    let number = trimmed.trim_end_matches('%').trim().replace(',', ".");
    let value: f64 = number.parse().ok()?;
    let percent = if as_fraction && !has_percent {
        value * 100.0
    } else {
        value
    };

    if percent.is_finite() && (0.0..=100.0).contains(&percent) {
        Some(percent)
    } else {
        None
    }
}
