//! Field-level checks used by the `Validate` impl of the app config.

use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 來源網址必須是 http(s)
pub fn validate_url(field: &str, raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(invalid(field, raw, "URL cannot be empty"));
    }
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, raw, format!("Unsupported URL scheme: {}", url.scheme())));
    }
    Ok(())
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

/// 檔名前綴只允許英數字、`-` 與 `_`，避免跳出 archive 目錄
pub fn validate_file_prefix(field: &str, prefix: &str) -> Result<()> {
    validate_non_empty_string(field, prefix)?;
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if !prefix.chars().all(allowed) {
        return Err(invalid(field, prefix, "Only ASCII letters, digits, '-' and '_' are allowed"));
    }
    Ok(())
}

pub fn validate_selector(field: &str, css: &str) -> Result<()> {
    validate_non_empty_string(field, css)?;
    scraper::Selector::parse(css)
        .map(drop)
        .map_err(|e| invalid(field, css, format!("Invalid CSS selector: {}", e)))
}

pub fn validate_range<T>(field: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(invalid(field, value, format!("Value must be between {} and {}", min, max)));
    }
    Ok(())
}
