pub mod writer;

pub use writer::{save_csv, write_records, CsvLayout, ExportError, Field};
