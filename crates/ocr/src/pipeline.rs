use tally_core::{OcrConfig, PixelRange, TransactionRecord};
use thiserror::Error;

use crate::columns::ColumnBands;
use crate::merge::StatementRows;
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};
use crate::render::{PageRenderer, RenderError};
use crate::rows::build_rows;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Page {page}: rendering failed: {source}")]
    Render {
        page: usize,
        #[source]
        source: RenderError,
    },
    #[error("Page {page}: image preprocessing failed: {source}")]
    Preprocess {
        page: usize,
        #[source]
        source: PreprocessError,
    },
    #[error("Page {page}: OCR recognition failed: {source}")]
    Ocr {
        page: usize,
        #[source]
        source: OcrError,
    },
}

/// Geometry and resolution the pipeline runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrSettings {
    pub dpi: u32,
    pub quick_check_dpi: u32,
    pub row_tolerance: i32,
    pub first_page: PixelRange,
    pub other_pages: PixelRange,
    pub columns: ColumnBands,
}

impl From<&OcrConfig> for OcrSettings {
    fn from(c: &OcrConfig) -> Self {
        Self {
            dpi: c.dpi,
            quick_check_dpi: c.quick_check_dpi,
            row_tolerance: c.row_tolerance,
            first_page: c.first_page,
            other_pages: c.other_pages,
            columns: c.columns.into(),
        }
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        (&OcrConfig::default()).into()
    }
}

impl OcrSettings {
    fn vertical_band(&self, page: usize) -> PixelRange {
        if page == 1 {
            self.first_page
        } else {
            self.other_pages
        }
    }
}

/// What happens to a page before any rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePlan {
    /// Disclaimer and legal notices page, never holds ledger rows.
    Skip,
    /// Only processed when a low-resolution read finds the ledger header.
    QuickCheck,
    Full,
}

pub fn page_plan(page: usize) -> PagePlan {
    match page {
        2 => PagePlan::Skip,
        3 => PagePlan::QuickCheck,
        _ => PagePlan::Full,
    }
}

/// Whether plain page text shows the ledger's column titles.
pub fn looks_like_ledger(text: &str) -> bool {
    text.contains("Date")
        && text.contains("Activity Description")
        && (text.contains("Deposits") || text.contains("Withdrawal"))
}

/// Orchestrates: page policy → render → grayscale → OCR → rows → records.
pub struct StatementOcr<B: OcrBackend> {
    backend: B,
    settings: OcrSettings,
}

impl<B: OcrBackend> StatementOcr<B> {
    pub fn new(backend: B, settings: OcrSettings) -> Self {
        Self { backend, settings }
    }

    /// Run every page of `renderer` and return records dated in `year`.
    pub fn extract<R: PageRenderer + ?Sized>(
        &self,
        renderer: &R,
        year: i32,
    ) -> Result<Vec<TransactionRecord>, PipelineError> {
        let rows = self.extract_rows(renderer)?;
        let records = rows.into_records(year);
        tracing::info!(records = records.len(), "OCR extraction finished");
        Ok(records)
    }

    /// Rows of every processed page, with continuations already merged.
    pub fn extract_rows<R: PageRenderer + ?Sized>(&self, renderer: &R) -> Result<StatementRows, PipelineError> {
        let mut doc = StatementRows::new();
        for page in 1..=renderer.page_count() {
            match page_plan(page) {
                PagePlan::Skip => {
                    tracing::debug!(page, "skipping disclaimer page");
                    continue;
                }
                PagePlan::QuickCheck if !self.passes_quick_check(renderer, page)? => {
                    tracing::debug!(page, "no ledger header, skipping page");
                    continue;
                }
                PagePlan::QuickCheck | PagePlan::Full => {}
            }

            let words = {
                let png = renderer
                    .render_page(page, self.settings.dpi)
                    .map_err(|source| PipelineError::Render { page, source })?;
                let gray = preprocess::prepare_for_ocr_from_bytes(&png)
                    .map_err(|source| PipelineError::Preprocess { page, source })?;
                self.backend
                    .recognize_words(&gray)
                    .map_err(|source| PipelineError::Ocr { page, source })?
            };

            let rows = build_rows(
                &words,
                self.settings.vertical_band(page),
                self.settings.row_tolerance,
                &self.settings.columns,
            );
            tracing::debug!(page, words = words.len(), rows = rows.len(), "OCR page processed");
            doc.push_page(rows);
        }
        Ok(doc)
    }

    fn passes_quick_check<R: PageRenderer + ?Sized>(&self, renderer: &R, page: usize) -> Result<bool, PipelineError> {
        let png = renderer
            .render_page(page, self.settings.quick_check_dpi)
            .map_err(|source| PipelineError::Render { page, source })?;
        let text = self
            .backend
            .recognize_text(&png)
            .map_err(|source| PipelineError::Ocr { page, source })?;
        Ok(looks_like_ledger(&text))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
