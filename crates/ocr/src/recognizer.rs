use std::io::Write;
use std::process::Command;
use thiserror::Error;

use crate::types::WordBox;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with status {status}: {stderr}")]
    Failed { program: String, status: i32, stderr: String },
    #[error("Malformed TSV output: {0}")]
    Tsv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over an OCR engine.
/// Implementations accept PNG bytes of one rendered page.
pub trait OcrBackend: Send + Sync {
    /// Words with the pixel position of their top-left corner.
    fn recognize_words(&self, image: &[u8]) -> Result<Vec<WordBox>, OcrError>;

    /// Plain page text, used for cheap content checks.
    fn recognize_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns the same words and text for every page, so row reconstruction can
/// be exercised without Tesseract installed.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    pub words: Vec<WordBox>,
    pub text: String,
}

impl MockRecognizer {
    pub fn new(words: Vec<WordBox>) -> Self {
        Self { words, text: String::new() }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize_words(&self, _image: &[u8]) -> Result<Vec<WordBox>, OcrError> {
        Ok(self.words.clone())
    }

    fn recognize_text(&self, _image: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract command-line backend ────────────────────────────────────────────

/// Runs the `tesseract` binary on a temporary PNG.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
    language: String,
}

impl TesseractCli {
    pub fn new(program: impl Into<String>, language: impl Into<String>) -> Self {
        Self { program: program.into(), language: language.into() }
    }

    /// Whether the configured binary answers `--version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run(&self, image: &[u8], extra: &[&str]) -> Result<Vec<u8>, OcrError> {
        let mut input = tempfile::Builder::new().prefix("tally-page-").suffix(".png").tempfile()?;
        input.write_all(image)?;
        input.flush()?;

        let output = Command::new(&self.program)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .args(extra)
            .output()
            .map_err(|source| OcrError::Spawn { program: self.program.clone(), source })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                program: self.program.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl OcrBackend for TesseractCli {
    fn recognize_words(&self, image: &[u8]) -> Result<Vec<WordBox>, OcrError> {
        let tsv = self.run(image, &["tsv"])?;
        parse_tsv(&tsv)
    }

    fn recognize_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let text = self.run(image, &[])?;
        Ok(String::from_utf8_lossy(&text).into_owned())
    }
}

const TSV_LEVEL: usize = 0;
const TSV_LEFT: usize = 6;
const TSV_TOP: usize = 7;
const TSV_TEXT: usize = 11;
const WORD_LEVEL: &str = "5";

/// Word-level entries of Tesseract's TSV output. Block, paragraph and line
/// entries and words with no text are skipped.
pub fn parse_tsv(data: &[u8]) -> Result<Vec<WordBox>, OcrError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(data);

    let mut words = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.get(TSV_LEVEL) != Some(WORD_LEVEL) {
            continue;
        }
        let text = record.get(TSV_TEXT).unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let coord = |i: usize| record.get(i).and_then(|v| v.trim().parse::<i32>().ok());
        let (Some(x), Some(y)) = (coord(TSV_LEFT), coord(TSV_TOP)) else {
            continue;
        };
        words.push(WordBox::new(text, x, y));
    }
    Ok(words)
}
