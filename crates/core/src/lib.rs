pub mod category;
pub mod config;
pub mod date;
pub mod money;
pub mod sort;
pub mod transaction;
pub mod year;

pub use category::{Categorizer, CategoryRule};
pub use config::{
    AccountConfig, ColumnRanges, Config, ConfigError, CsvConfig, DetectionConfig, OcrConfig,
    PathsConfig, PixelRange,
};
pub use date::{format_statement_date, format_with_year, parse_record_date, DateError};
pub use money::{Money, MoneyError};
pub use sort::sort_by_date;
pub use transaction::{check_number, Amount, Flow, TransactionRecord};
pub use year::{statement_year, statement_year_for_path};
