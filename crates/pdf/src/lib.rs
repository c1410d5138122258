pub mod detect;
pub mod document;
pub mod files;
mod layout;

pub use detect::{detect_from_texts, detect_mode, meaningful_chars, ExtractionMode};
pub use document::{PdfDocument, PdfError};
pub use files::list_pdf_files;
