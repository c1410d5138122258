use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Format used by every record date the sorter understands.
pub const RECORD_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid statement date '{token}' for year {year}")]
    Invalid { token: String, year: i32 },
}

fn re_month_day() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^([A-Za-z]{3})\s?(\d{1,2})$").expect("invalid regex"))
}

/// Turn a `Mon D` / `MonD` token into `M/D/YYYY` (no zero padding).
///
/// The token has already matched the transaction pattern, so any failure
/// here (unknown month, day out of range) is reported as an error.
pub fn format_statement_date(token: &str, year: i32) -> Result<String, DateError> {
    let invalid = || DateError::Invalid { token: token.to_string(), year };
    let caps = re_month_day().captures(token.trim()).ok_or_else(invalid)?;
    let normalized = format!("{} {} {}", &caps[1], &caps[2], year);
    let date = NaiveDate::parse_from_str(&normalized, "%b %d %Y").map_err(|_| invalid())?;
    Ok(date.format("%-m/%-d/%Y").to_string())
}

/// Combine an OCR `MM/DD` band with the statement year into `MM/DD/YYYY`.
///
/// Anything that is not exactly `month/day` with a valid calendar date is
/// returned unchanged.
pub fn format_with_year(month_day: &str, year: i32) -> String {
    let Some((month, day)) = month_day.split_once('/') else {
        return month_day.to_string();
    };
    if day.contains('/') {
        return month_day.to_string();
    }
    let parsed = month
        .trim()
        .parse::<u32>()
        .ok()
        .zip(day.trim().parse::<u32>().ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d));
    match parsed {
        Some(date) => date.format(RECORD_DATE_FORMAT).to_string(),
        None => month_day.to_string(),
    }
}

/// Parse a record date written by either formatter.
pub fn parse_record_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), RECORD_DATE_FORMAT).ok()
}
