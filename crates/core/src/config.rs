use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::category::{Categorizer, CategoryRule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Inclusive pixel interval on a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRange {
    pub start: i32,
    pub end: i32,
}

impl PixelRange {
    pub const fn new(start: i32, end: i32) -> Self {
        PixelRange { start, end }
    }

    pub fn contains(self, v: i32) -> bool {
        v >= self.start && v <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub pdf_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pdf_path: PathBuf::from("data/input"),
            output_dir: PathBuf::from("data/output"),
        }
    }
}

/// Static fields written alongside every text-mode record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub account_type: String,
    pub account_name: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            account_type: "Checking".to_string(),
            account_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub write_individual_files: bool,
    /// Headers for text-mode output.
    pub headers: Vec<String>,
    /// Headers for OCR-mode output.
    pub ocr_headers: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        let owned = |hs: &[&str]| hs.iter().map(|h| h.to_string()).collect();
        Self {
            write_individual_files: false,
            headers: owned(&[
                "Date",
                "Account",
                "Description",
                "Check Number",
                "Category",
                "Credit",
                "Debit",
                "Account Name",
            ]),
            ocr_headers: owned(&["Date", "Category", "Description", "Debit Amount", "Credit Amount"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub pages_to_sample: usize,
    /// Average meaningful characters per page above which a PDF is read
    /// from its text layer.
    pub min_chars_per_page: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { pages_to_sample: 3, min_chars_per_page: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRanges {
    pub date: PixelRange,
    pub description: PixelRange,
    pub credit: PixelRange,
    pub debit: PixelRange,
}

impl Default for ColumnRanges {
    fn default() -> Self {
        // Letter page rendered at 300 DPI is 2550 px wide.
        Self {
            date: PixelRange::new(100, 330),
            description: PixelRange::new(331, 1650),
            credit: PixelRange::new(1651, 2050),
            debit: PixelRange::new(2051, 2450),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub dpi: u32,
    pub quick_check_dpi: u32,
    pub row_tolerance: i32,
    /// Vertical ledger band on page 1, below the letterhead.
    pub first_page: PixelRange,
    /// Vertical ledger band on every later page.
    pub other_pages: PixelRange,
    pub columns: ColumnRanges,
    pub tesseract: String,
    pub pdftoppm: String,
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            quick_check_dpi: 150,
            row_tolerance: 10,
            first_page: PixelRange::new(1100, 3150),
            other_pages: PixelRange::new(250, 3150),
            columns: ColumnRanges::default(),
            tesseract: "tesseract".to_string(),
            pdftoppm: "pdftoppm".to_string(),
            language: "eng".to_string(),
        }
    }
}

/// Everything the pipelines read. Loaded once at start-up and passed by
/// reference; nothing mutates it afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub account: AccountConfig,
    pub csv: CsvConfig,
    pub detection: DetectionConfig,
    pub ocr: OcrConfig,
    pub categories: Vec<CategoryRule>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ocr = &self.ocr;
        let ranges = [
            ("ocr.first_page", ocr.first_page),
            ("ocr.other_pages", ocr.other_pages),
            ("ocr.columns.date", ocr.columns.date),
            ("ocr.columns.description", ocr.columns.description),
            ("ocr.columns.credit", ocr.columns.credit),
            ("ocr.columns.debit", ocr.columns.debit),
        ];
        for (name, range) in ranges {
            if range.start > range.end {
                return Err(ConfigError::Invalid(format!(
                    "{name}: start {} is after end {}",
                    range.start, range.end
                )));
            }
        }
        if ocr.row_tolerance < 0 {
            return Err(ConfigError::Invalid("ocr.row_tolerance must not be negative".into()));
        }
        if ocr.dpi == 0 || ocr.quick_check_dpi == 0 {
            return Err(ConfigError::Invalid("ocr dpi values must be positive".into()));
        }
        if self.csv.headers.is_empty() || self.csv.ocr_headers.is_empty() {
            return Err(ConfigError::Invalid("csv header lists must not be empty".into()));
        }
        if self.detection.pages_to_sample == 0 {
            return Err(ConfigError::Invalid("detection.pages_to_sample must be at least 1".into()));
        }
        Ok(())
    }

    pub fn categorizer(&self) -> Categorizer {
        Categorizer::new(self.categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.csv.headers.len(), 8);
        assert!(config.categories.is_empty());
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = Config::from_toml_str(
            r#"
            [ocr]
            row_tolerance = 6

            [ocr.columns]
            date = { start = 0, end = 200 }
            description = { start = 201, end = 1500 }
            credit = { start = 1501, end = 1900 }
            debit = { start = 1901, end = 2400 }

            [account]
            account_name = "Operating"

            [[categories]]
            keyword = "AMAZON"
            category = "Shopping"
            "#,
        )
        .unwrap();
        assert_eq!(config.ocr.row_tolerance, 6);
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.ocr.columns.date, PixelRange::new(0, 200));
        assert_eq!(config.account.account_type, "Checking");
        assert_eq!(config.account.account_name, "Operating");
        assert_eq!(config.categorizer().categorize("amazon.com"), "Shopping");
    }

    #[test]
    fn inverted_band_is_rejected() {
        let err = Config::from_toml_str(
            r#"
            [ocr]
            first_page = { start = 900, end = 100 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("ocr.first_page")));
    }

    #[test]
    fn empty_headers_are_rejected() {
        let err = Config::from_toml_str("[csv]\nheaders = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.categories.push(CategoryRule::new("FEE", "Bank Fees"));
        let text = config.to_toml_string().unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(back.categories, config.categories);
        assert_eq!(back.ocr.columns, config.ocr.columns);
    }

    #[test]
    fn pixel_range_is_inclusive() {
        let r = PixelRange::new(10, 20);
        assert!(r.contains(10));
        assert!(r.contains(20));
        assert!(!r.contains(9));
        assert!(!r.contains(21));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
