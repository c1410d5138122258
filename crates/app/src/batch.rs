use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tally_core::{sort_by_date, statement_year_for_path, Categorizer, Config, TransactionRecord};
use tally_export::save_csv;
use tally_ocr::{OcrSettings, StatementOcr, TesseractCli};
use tally_pdf::{detect_mode, ExtractionMode, PdfDocument};
use tally_text::{parse_statement, StandardClassifier};

pub const MASTER_TEXT_FILE: &str = "output_master_text.csv";
pub const MASTER_OCR_FILE: &str = "output_master_ocr.csv";

/// Records read from one statement.
#[derive(Debug)]
pub struct Extraction {
    pub mode: ExtractionMode,
    pub records: Vec<TransactionRecord>,
}

/// Open one PDF, pick its mode, and run the matching pipeline. Records come
/// back categorized but unsorted.
pub fn extract_file(
    path: &Path,
    forced: Option<ExtractionMode>,
    config: &Config,
    categorizer: &Categorizer,
) -> Result<Extraction> {
    let doc = PdfDocument::open(path)?.with_pdftoppm(config.ocr.pdftoppm.as_str());
    let mode = forced.unwrap_or_else(|| {
        detect_mode(&doc, config.detection.pages_to_sample, config.detection.min_chars_per_page)
    });
    let year = statement_year_for_path(path);
    tracing::info!(file = %path.display(), %mode, year, pages = doc.page_count(), "extracting");

    let mut records = match mode {
        ExtractionMode::Text => {
            let pages = doc.page_texts()?;
            parse_statement(&pages, year, &StandardClassifier)?
        }
        ExtractionMode::Ocr => {
            let backend = TesseractCli::new(config.ocr.tesseract.as_str(), config.ocr.language.as_str());
            if !backend.is_available() {
                bail!(
                    "{} needs OCR but tesseract was not found at '{}' (install it or set ocr.tesseract)",
                    path.display(),
                    config.ocr.tesseract
                );
            }
            StatementOcr::new(backend, OcrSettings::from(&config.ocr)).extract(&doc, year)?
        }
    };
    categorizer.apply(&mut records);
    Ok(Extraction { mode, records })
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub individual: bool,
    pub fail_fast: bool,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: Vec<PathBuf>,
    pub text_records: usize,
    pub ocr_records: usize,
    pub written: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn total_records(&self) -> usize {
        self.text_records + self.ocr_records
    }
}

/// Run `extract` over every file and write the CSV outputs.
///
/// A file that fails to extract or to write its own CSV is logged and
/// counted in `failed` unless `fail_fast` is set, in which case its error is
/// returned and nothing further is written.
pub fn run_batch<F>(files: &[PathBuf], config: &Config, options: &BatchOptions, mut extract: F) -> Result<BatchSummary>
where
    F: FnMut(&Path) -> Result<Extraction>,
{
    let mut summary = BatchSummary::default();
    let mut text_records = Vec::new();
    let mut ocr_records = Vec::new();

    for path in files {
        let extraction = match extract(path) {
            Ok(extraction) => extraction,
            Err(e) if options.fail_fast => {
                return Err(e.context(format!("processing {}", path.display())));
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %format!("{e:#}"), "failed to process statement");
                summary.failed.push(path.clone());
                continue;
            }
        };
        summary.processed += 1;
        tracing::info!(file = %path.display(), mode = %extraction.mode, records = extraction.records.len(), "statement done");

        let mut records = extraction.records;
        if options.individual && !records.is_empty() {
            sort_by_date(&mut records);
            let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            let saved = save_csv(
                &options.output_dir,
                &format!("output_{stem}.csv"),
                headers_for(config, extraction.mode),
                &records,
                &config.account,
            )
            .with_context(|| format!("writing output for {}", path.display()));
            match saved {
                Ok(written) => summary.written.push(written),
                Err(e) if options.fail_fast => return Err(e),
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %format!("{e:#}"), "failed to write statement CSV");
                    summary.failed.push(path.clone());
                }
            }
        }
        match extraction.mode {
            ExtractionMode::Text => text_records.extend(records),
            ExtractionMode::Ocr => ocr_records.extend(records),
        }
    }

    summary.text_records = text_records.len();
    summary.ocr_records = ocr_records.len();
    for (mode, file_name, mut records) in [
        (ExtractionMode::Text, MASTER_TEXT_FILE, text_records),
        (ExtractionMode::Ocr, MASTER_OCR_FILE, ocr_records),
    ] {
        if records.is_empty() {
            continue;
        }
        sort_by_date(&mut records);
        let written = save_csv(&options.output_dir, file_name, headers_for(config, mode), &records, &config.account)
            .with_context(|| format!("writing {file_name}"))?;
        summary.written.push(written);
    }
    Ok(summary)
}

fn headers_for(config: &Config, mode: ExtractionMode) -> &[String] {
    match mode {
        ExtractionMode::Text => &config.csv.headers,
        ExtractionMode::Ocr => &config.csv.ocr_headers,
    }
}
