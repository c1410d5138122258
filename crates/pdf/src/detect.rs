use std::fmt;

use crate::document::PdfDocument;

/// How a statement's transactions are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMode {
    /// From the PDF text layer.
    Text,
    /// From rendered page images.
    Ocr,
}

impl ExtractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMode::Text => "text",
            ExtractionMode::Ocr => "ocr",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letters, digits and whitespace left after dropping punctuation, with the
/// ends trimmed.
pub fn meaningful_chars(text: &str) -> usize {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.trim().chars().count()
}

/// Text mode when the average page carries strictly more than `min_chars`
/// meaningful characters. No pages means OCR.
pub fn detect_from_texts<I, S>(texts: I, min_chars: usize) -> ExtractionMode
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (total, pages) = texts
        .into_iter()
        .fold((0usize, 0usize), |(total, pages), t| (total + meaningful_chars(t.as_ref()), pages + 1));
    if pages == 0 {
        return ExtractionMode::Ocr;
    }
    let average = total as f64 / pages as f64;
    if average > min_chars as f64 {
        ExtractionMode::Text
    } else {
        ExtractionMode::Ocr
    }
}

/// Sample the first `sample_pages` pages of `doc`. Any extraction failure
/// selects OCR.
pub fn detect_mode(doc: &PdfDocument, sample_pages: usize, min_chars: usize) -> ExtractionMode {
    let n = sample_pages.min(doc.page_count());
    let texts: Result<Vec<String>, _> = (1..=n).map(|p| doc.page_text(p)).collect();
    match texts {
        Ok(texts) => {
            let mode = detect_from_texts(&texts, min_chars);
            tracing::debug!(path = %doc.path().display(), sampled = n, %mode, "detected extraction mode");
            mode
        }
        Err(e) => {
            tracing::warn!(path = %doc.path().display(), error = %e, "text layer unreadable, using OCR");
            ExtractionMode::Ocr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::write_pdf;

    #[test]
    fn punctuation_does_not_count() {
        assert_eq!(meaningful_chars("  $1,234.56  "), 6);
        assert_eq!(meaningful_chars("ab cd"), 5);
        assert_eq!(meaningful_chars("...  ..."), 0);
    }

    #[test]
    fn average_must_exceed_threshold() {
        let page = "x".repeat(100);
        assert_eq!(detect_from_texts([page.as_str()], 100), ExtractionMode::Ocr);
        let page = "x".repeat(101);
        assert_eq!(detect_from_texts([page.as_str()], 100), ExtractionMode::Text);
    }

    #[test]
    fn sparse_pages_pull_average_down() {
        let dense = "a".repeat(250);
        assert_eq!(detect_from_texts([dense.as_str(), "", ""], 100), ExtractionMode::Ocr);
        assert_eq!(detect_from_texts([dense.as_str(), dense.as_str(), ""], 100), ExtractionMode::Text);
    }

    #[test]
    fn no_pages_means_ocr() {
        assert_eq!(detect_from_texts(Vec::<String>::new(), 0), ExtractionMode::Ocr);
    }

    #[test]
    fn detects_from_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.pdf");
        let line = "Transaction Detail Jan 5 COFFEE SHOP 4 50 ".repeat(4);
        write_pdf(&path, &[line.as_str(), "", ""]);
        let doc = PdfDocument::open(&path).unwrap();

        assert_eq!(detect_mode(&doc, 1, 100), ExtractionMode::Text);
        assert_eq!(detect_mode(&doc, 3, 100), ExtractionMode::Ocr);
    }

    #[test]
    fn display_names() {
        assert_eq!(ExtractionMode::Text.to_string(), "text");
        assert_eq!(ExtractionMode::Ocr.to_string(), "ocr");
    }
}
