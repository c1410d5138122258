use regex::Regex;
use std::sync::OnceLock;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_transaction,
    r"^([A-Za-z]{3}\s?\d{1,2})\s+(.+?)\s+(-?\$[\d,]+\.\d{2})(?:\s+\$[\d,]+\.\d{2})?$");
re!(re_month_start,
    r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\s?\d{1,2}\b");
re!(re_reference,
    r"^[A-Z0-9]+$");

/// The pieces of a line that matched the transaction grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch<'a> {
    pub date: &'a str,
    pub description: &'a str,
    pub amount: &'a str,
}

/// Statement-template grammar used by the text-mode parser.
///
/// The parser owns cursor movement and continuation merging; everything that
/// depends on how a particular bank lays out its text lives behind this trait.
pub trait LineClassifier {
    /// Marks the line before the first ledger line.
    fn is_section_start(&self, line: &str) -> bool;

    /// Marks the end of the ledger on this page.
    fn is_section_end(&self, line: &str) -> bool;

    /// Drop leading artifacts that precede the date token.
    fn strip_leading_noise<'a>(&self, line: &'a str) -> &'a str;

    /// Whether a date token appears anywhere in the line.
    fn has_date_token(&self, line: &str) -> bool;

    fn match_transaction<'a>(&self, line: &'a str) -> Option<LineMatch<'a>>;

    fn is_opening_balance(&self, description: &str) -> bool;

    /// Bank reference IDs that wrap onto their own line.
    fn is_reference_noise(&self, line: &str) -> bool;
}

/// `Jan 5  DESCRIPTION  -$42.10  $1,000.00` layout with a
/// "Transaction Detail" … "Ending Balance" ledger section.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardClassifier;

impl LineClassifier for StandardClassifier {
    fn is_section_start(&self, line: &str) -> bool {
        line.to_lowercase().contains("transaction detail")
    }

    fn is_section_end(&self, line: &str) -> bool {
        line.to_lowercase().contains("ending balance")
    }

    fn strip_leading_noise<'a>(&self, line: &'a str) -> &'a str {
        match re_month_start().find(line) {
            Some(m) if m.start() > 0 => &line[m.start()..],
            _ => line,
        }
    }

    fn has_date_token(&self, line: &str) -> bool {
        re_month_start().is_match(line)
    }

    fn match_transaction<'a>(&self, line: &'a str) -> Option<LineMatch<'a>> {
        let c = re_transaction().captures(line.trim())?;
        Some(LineMatch {
            date: c.get(1)?.as_str(),
            description: c.get(2)?.as_str(),
            amount: c.get(3)?.as_str(),
        })
    }

    fn is_opening_balance(&self, description: &str) -> bool {
        description.trim_start().to_lowercase().starts_with("beginning balance")
    }

    fn is_reference_noise(&self, line: &str) -> bool {
        line.len() > 15 && !line.contains(' ') && re_reference().is_match(line)
    }
}
