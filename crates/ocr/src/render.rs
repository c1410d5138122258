use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with status {status}: {stderr}")]
    Failed { program: String, status: i32, stderr: String },
    #[error("Renderer produced no image for page {0}")]
    MissingOutput(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rasterizes pages of one document.
pub trait PageRenderer {
    fn page_count(&self) -> usize;

    /// PNG bytes of `page` (1-based) at `dpi`.
    fn render_page(&self, page: usize, dpi: u32) -> Result<Vec<u8>, RenderError>;
}
