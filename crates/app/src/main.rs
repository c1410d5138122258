use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tally_core::{Config, TransactionRecord};
use tally_pdf::{detect_mode, list_pdf_files, ExtractionMode, PdfDocument};
use tracing_subscriber::EnvFilter;

mod batch;
mod settings;

use batch::{extract_file, run_batch, BatchOptions};

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Turn bank-statement PDFs into transaction CSVs")]
struct Cli {
    /// Config file (default: ./tally.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract every statement in a directory (or one file) to CSV
    Extract {
        /// PDF file or directory (default: paths.pdf_path)
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
        mode: ModeArg,

        /// Output directory (default: paths.output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also write one CSV per statement
        #[arg(long)]
        individual: bool,

        /// Stop at the first statement that fails
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the transactions of a single statement
    Inspect {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
        mode: ModeArg,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show which extraction mode each statement would use
    Detect {
        input: Option<PathBuf>,
    },

    /// Write a starter config file
    InitConfig {
        #[arg(default_value = settings::CONFIG_FILE)]
        path: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Auto,
    Text,
    Ocr,
}

impl ModeArg {
    fn forced(self) -> Option<ExtractionMode> {
        match self {
            ModeArg::Auto => None,
            ModeArg::Text => Some(ExtractionMode::Text),
            ModeArg::Ocr => Some(ExtractionMode::Ocr),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig { path } => {
            settings::write_starter_config(&path)?;
            println!("Wrote {}", path.display());
        }

        Command::Extract { input, mode, output_dir, individual, fail_fast } => {
            let config = settings::load_config(cli.config.as_deref())?;
            let input = input.unwrap_or_else(|| config.paths.pdf_path.clone());
            let options = BatchOptions {
                output_dir: output_dir.unwrap_or_else(|| config.paths.output_dir.clone()),
                individual: individual || config.csv.write_individual_files,
                fail_fast,
            };
            extract(&input, mode, &config, &options)?;
        }

        Command::Inspect { file, mode, json } => {
            let config = settings::load_config(cli.config.as_deref())?;
            let extraction = extract_file(&file, mode.forced(), &config, &config.categorizer())
                .with_context(|| format!("processing {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&extraction.records)?);
            } else {
                println!("{} ({} mode, {} transactions)", file.display(), extraction.mode, extraction.records.len());
                print_table(&extraction.records);
            }
        }

        Command::Detect { input } => {
            let config = settings::load_config(cli.config.as_deref())?;
            let input = input.unwrap_or_else(|| config.paths.pdf_path.clone());
            for path in list_pdf_files(&input)? {
                match PdfDocument::open(&path) {
                    Ok(doc) => {
                        let mode = detect_mode(&doc, config.detection.pages_to_sample, config.detection.min_chars_per_page);
                        println!("{mode}\t{}", path.display());
                    }
                    Err(e) => eprintln!("error\t{}: {e}", path.display()),
                }
            }
        }
    }

    Ok(())
}

fn extract(input: &Path, mode: ModeArg, config: &Config, options: &BatchOptions) -> Result<()> {
    let files = list_pdf_files(input)?;
    if files.is_empty() {
        println!("No PDF files found at {}", input.display());
        return Ok(());
    }
    tracing::info!(count = files.len(), input = %input.display(), "found statements");

    let categorizer = config.categorizer();
    let summary = run_batch(&files, config, options, |path| {
        extract_file(path, mode.forced(), config, &categorizer)
    })?;

    if summary.total_records() == 0 {
        println!("No transactions found in {} file(s); nothing written.", summary.processed);
    } else {
        println!(
            "Extracted {} text-mode and {} OCR-mode transactions from {} file(s)",
            summary.text_records, summary.ocr_records, summary.processed
        );
        for path in &summary.written {
            println!("  wrote {}", path.display());
        }
    }

    if !summary.failed.is_empty() {
        for path in &summary.failed {
            eprintln!("  failed: {}", path.display());
        }
        bail!("{} of {} file(s) failed", summary.failed.len(), files.len());
    }
    Ok(())
}

fn print_table(records: &[TransactionRecord]) {
    println!("{:<12} {:>12} {:>12}  {:<16} DESCRIPTION", "DATE", "CREDIT", "DEBIT", "CATEGORY");
    for r in records {
        let credit = r.credit().map(ToString::to_string).unwrap_or_default();
        let debit = r.debit().map(ToString::to_string).unwrap_or_default();
        println!("{:<12} {:>12} {:>12}  {:<16} {}", r.date, credit, debit, r.category, r.description);
    }
}
