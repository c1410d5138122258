//! Text-layer statement parsing.
//!
//! Pages come in as plain text extracted from the PDF; records come out with
//! dates already normalized and amounts placed on the credit or debit side.

pub mod classifier;
pub mod parser;

pub use classifier::{LineClassifier, LineMatch, StandardClassifier};
pub use parser::{parse_page, parse_statement, PageTransactions, TextError};
