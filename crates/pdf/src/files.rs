use std::path::{Path, PathBuf};

use crate::document::PdfError;

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// PDFs to process for `path`: the `.pdf` files directly inside a
/// directory sorted by file name, a single `.pdf` file, or nothing.
pub fn list_pdf_files(path: &Path) -> Result<Vec<PathBuf>, PdfError> {
    if path.is_file() {
        return Ok(if is_pdf(path) { vec![path.to_path_buf()] } else { Vec::new() });
    }
    if !path.is_dir() {
        return Ok(Vec::new());
    }

    let io_err = |source: std::io::Error| PdfError::Io { path: path.to_path_buf(), source };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let entry_path = entry.map_err(io_err)?.path();
        if entry_path.is_file() && is_pdf(&entry_path) {
            files.push(entry_path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
