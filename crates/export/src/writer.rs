use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tally_core::{AccountConfig, TransactionRecord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unknown CSV header: '{0}'")]
    UnknownHeader(String),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A record field an output column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Account,
    Description,
    CheckNumber,
    Category,
    Credit,
    Debit,
    AccountName,
}

impl FromStr for Field {
    type Err = ExportError;

    /// Header names match ignoring ASCII case and surrounding whitespace.
    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let field = match header.trim().to_ascii_lowercase().as_str() {
            "date" => Field::Date,
            "account" => Field::Account,
            "description" => Field::Description,
            "check number" => Field::CheckNumber,
            "category" => Field::Category,
            "credit" | "credit amount" => Field::Credit,
            "debit" | "debit amount" => Field::Debit,
            "account name" => Field::AccountName,
            _ => return Err(ExportError::UnknownHeader(header.to_string())),
        };
        Ok(field)
    }
}

impl Field {
    fn value(self, record: &TransactionRecord, account: &AccountConfig) -> String {
        match self {
            Field::Date => record.date.clone(),
            Field::Account => account.account_type.clone(),
            Field::Description => record.description.clone(),
            Field::CheckNumber => record.check_number.clone().unwrap_or_default(),
            Field::Category => record.category.clone(),
            Field::Credit => record.credit().map(ToString::to_string).unwrap_or_default(),
            Field::Debit => record.debit().map(ToString::to_string).unwrap_or_default(),
            Field::AccountName => account.account_name.clone(),
        }
    }
}

/// Output headers resolved to record fields.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    headers: Vec<String>,
    fields: Vec<Field>,
}

impl CsvLayout {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Result<Self, ExportError> {
        let fields = headers
            .iter()
            .map(|h| h.as_ref().parse())
            .collect::<Result<Vec<Field>, _>>()?;
        Ok(Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            fields,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Write a header row followed by one row per record.
pub fn write_records<W: Write>(
    writer: W,
    layout: &CsvLayout,
    records: &[TransactionRecord],
    account: &AccountConfig,
) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(layout.headers())?;
    for record in records {
        out.write_record(layout.fields().iter().map(|f| f.value(record, account)))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write `records` to `dir/file_name`, creating `dir` if needed.
/// Headers are validated before anything touches the disk.
pub fn save_csv<S: AsRef<str>>(
    dir: &Path,
    file_name: &str,
    headers: &[S],
    records: &[TransactionRecord],
    account: &AccountConfig,
) -> Result<PathBuf, ExportError> {
    let layout = CsvLayout::new(headers)?;
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io { path: dir.to_path_buf(), source })?;

    let path = dir.join(file_name);
    let file = std::fs::File::create(&path).map_err(|source| ExportError::Io { path: path.clone(), source })?;
    write_records(std::io::BufWriter::new(file), &layout, records, account)?;
    tracing::info!(path = %path.display(), records = records.len(), "CSV written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{Amount, Flow, Money};

    const TEXT_HEADERS: [&str; 8] = [
        "Date",
        "Account",
        "Description",
        "Check Number",
        "Category",
        "Credit",
        "Debit",
        "Account Name",
    ];

    fn account() -> AccountConfig {
        AccountConfig { account_type: "Checking".into(), account_name: "Operating".into() }
    }

    fn render(headers: &[&str], records: &[TransactionRecord]) -> String {
        let layout = CsvLayout::new(headers).unwrap();
        let mut out = Vec::new();
        write_records(&mut out, &layout, records, &account()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_layout_row() {
        let mut r = TransactionRecord::new(
            "1/5/2024",
            "CHECK 1042 STORE, INC",
            Some(Flow::Debit(Amount::Value(Money::from_cents(4210)))),
        );
        r.category = "Shopping".into();
        let out = render(&TEXT_HEADERS, &[r]);
        assert_eq!(
            out,
            "Date,Account,Description,Check Number,Category,Credit,Debit,Account Name\n\
             1/5/2024,Checking,\"CHECK 1042 STORE, INC\",1042,Shopping,,42.10,Operating\n"
        );
    }

    #[test]
    fn ocr_layout_keeps_raw_amounts() {
        let r = TransactionRecord::new(
            "01/05/2024",
            "PAYROLL",
            Some(Flow::Credit(Amount::Raw("$1,200.00".into()))),
        );
        let out = render(&["Date", "Category", "Description", "Debit Amount", "Credit Amount"], &[r]);
        assert_eq!(
            out,
            "Date,Category,Description,Debit Amount,Credit Amount\n01/05/2024,,PAYROLL,,\"$1,200.00\"\n"
        );
    }

    #[test]
    fn headers_match_loosely() {
        let layout = CsvLayout::new(&[" date ", "CHECK NUMBER"]).unwrap();
        assert_eq!(layout.fields(), [Field::Date, Field::CheckNumber]);
        assert_eq!(layout.headers(), [" date ", "CHECK NUMBER"]);
    }

    #[test]
    fn unknown_header_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let err = save_csv(&out_dir, "x.csv", &["Date", "Memo"], &[], &account()).unwrap_err();
        assert!(matches!(err, ExportError::UnknownHeader(h) if h == "Memo"));
        assert!(!out_dir.exists());
    }

    #[test]
    fn save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("out");
        let records = vec![TransactionRecord::new("1/2/2024", "FEE", None)];
        let path = save_csv(&out_dir, "output_master_text.csv", &TEXT_HEADERS, &records, &account()).unwrap();
        assert_eq!(path, out_dir.join("output_master_text.csv"));
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with("1/2/2024,Checking,FEE,,,,,Operating\n"));
    }
}
