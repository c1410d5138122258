use lopdf::{Document, ObjectId};
use std::path::{Path, PathBuf};
use std::process::Command;
use tally_ocr::{PageRenderer, RenderError};
use thiserror::Error;

use crate::layout::page_lines;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },
    #[error("Failed to extract text from page {page}: {source}")]
    Text {
        page: usize,
        #[source]
        source: lopdf::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An opened statement PDF. Text comes from the text layer; raster pages
/// come from Poppler's `pdftoppm`.
pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
    page_ids: Vec<ObjectId>,
    pages: usize,
    pdftoppm: String,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("path", &self.path)
            .field("pages", &self.pages)
            .finish()
    }
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let doc = Document::load(path).map_err(|source| PdfError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let pages = page_ids.len();
        tracing::debug!(path = %path.display(), pages, "opened PDF");
        Ok(Self {
            path: path.to_path_buf(),
            doc,
            page_ids,
            pages,
            pdftoppm: "pdftoppm".to_string(),
        })
    }

    /// Use a specific `pdftoppm` binary for rendering.
    pub fn with_pdftoppm(mut self, program: impl Into<String>) -> Self {
        self.pdftoppm = program.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn page_id(&self, page: usize) -> Result<ObjectId, PdfError> {
        page.checked_sub(1)
            .and_then(|index| self.page_ids.get(index))
            .copied()
            .ok_or(PdfError::PageOutOfRange { page, count: self.pages })
    }

    /// Plain text of one page (1-based), one line per text row.
    pub fn page_text(&self, page: usize) -> Result<String, PdfError> {
        let id = self.page_id(page)?;
        page_lines(&self.doc, id).map_err(|source| PdfError::Text { page, source })
    }

    /// Text of every page in order.
    pub fn page_texts(&self) -> Result<Vec<String>, PdfError> {
        (1..=self.pages).map(|p| self.page_text(p)).collect()
    }
}

impl PageRenderer for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, page: usize, dpi: u32) -> Result<Vec<u8>, RenderError> {
        if page == 0 || page > self.pages {
            return Err(RenderError::PageOutOfRange { page, count: self.pages });
        }
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");
        let number = page.to_string();

        let output = Command::new(&self.pdftoppm)
            .args(["-f", number.as_str(), "-l", number.as_str()])
            .arg("-r")
            .arg(dpi.to_string())
            .args(["-png", "-singlefile"])
            .arg(&self.path)
            .arg(&prefix)
            .output()
            .map_err(|source| RenderError::Spawn { program: self.pdftoppm.clone(), source })?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                program: self.pdftoppm.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        std::fs::read(prefix.with_extension("png")).map_err(|_| RenderError::MissingOutput(page))
    }
}
