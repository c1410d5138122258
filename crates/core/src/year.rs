use chrono::Datelike;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn re_day_month_year() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})-(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)-(\d{4})\b")
            .expect("invalid regex")
    })
}

fn re_four_digits() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(\d{4})").expect("invalid regex"))
}

/// Resolve the statement year from a file name.
///
/// Tries `DD-Mon-YYYY` first, then the first run of four digits anywhere in
/// the name, then `fallback`.
pub fn statement_year(file_name: &str, fallback: i32) -> i32 {
    if let Some(c) = re_day_month_year().captures(file_name) {
        if let Ok(year) = c[3].parse() {
            return year;
        }
    }
    re_four_digits()
        .captures(file_name)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(fallback)
}

/// [`statement_year`] on a path's file name, falling back to the current year.
pub fn statement_year_for_path(path: &Path) -> i32 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    statement_year(&name, chrono::Local::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_month_year_pattern() {
        assert_eq!(statement_year("statement-15-Mar-2023.pdf", 1999), 2023);
    }

    #[test]
    fn day_month_year_wins_over_earlier_digits() {
        assert_eq!(statement_year("acct1234-05-jan-2022.pdf", 1999), 2022);
    }

    #[test]
    fn bare_four_digits() {
        assert_eq!(statement_year("chase-2024-01.pdf", 1999), 2024);
        assert_eq!(statement_year("stmt202311.pdf", 1999), 2023);
    }

    #[test]
    fn falls_back_when_no_year() {
        assert_eq!(statement_year("statement.pdf", 2026), 2026);
    }

    #[test]
    fn path_uses_file_name_only() {
        let p = Path::new("/archive/2019/statement_2024.pdf");
        assert_eq!(statement_year_for_path(p), 2024);
    }
}
