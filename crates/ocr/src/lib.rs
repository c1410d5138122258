//! OCR-mode statement reconstruction: rendered pages become word boxes,
//! word boxes become table rows, table rows become transaction records.

pub mod columns;
pub mod merge;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod render;
pub mod rows;
pub mod types;

pub use columns::ColumnBands;
pub use merge::{merge_continuations, repair_columns, StatementRows};
pub use pipeline::{looks_like_ledger, page_plan, OcrSettings, PagePlan, PipelineError, StatementOcr};
pub use preprocess::{prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{parse_tsv, MockRecognizer, OcrBackend, OcrError, TesseractCli};
pub use render::{PageRenderer, RenderError};
pub use rows::{assign_columns, build_rows, group_rows};
pub use types::{ColumnKind, OcrRow, WordBox};
