use tally_core::{format_statement_date, DateError, Flow, Money, MoneyError, TransactionRecord};
use thiserror::Error;

use crate::classifier::{LineClassifier, LineMatch};

#[derive(Debug, Error)]
pub enum TextError {
    #[error("page {page}, line {line}: {source}")]
    InvalidDate {
        page: usize,
        line: usize,
        #[source]
        source: DateError,
    },
    #[error("page {page}, line {line}: {source}")]
    InvalidAmount {
        page: usize,
        line: usize,
        #[source]
        source: MoneyError,
    },
}

/// A matched transaction line waiting for its continuation lines.
#[derive(Debug)]
struct Pending<'a> {
    index: usize,
    head: LineMatch<'a>,
}

#[derive(Debug)]
enum State<'a> {
    SeekingStart,
    InLedger,
    CollectingContinuation(Pending<'a>),
    Done,
}

/// Lazy iterator over the transactions of one page of statement text.
///
/// Yields nothing for pages without a ledger section. A date or amount that
/// fails to parse after the line matched is yielded once as an error and
/// ends the iteration.
pub struct PageTransactions<'a, C: LineClassifier> {
    lines: Vec<&'a str>,
    classifier: &'a C,
    year: i32,
    page: usize,
    cursor: usize,
    state: State<'a>,
}

/// Start parsing one page. Nothing is scanned until the iterator is polled.
pub fn parse_page<'a, C: LineClassifier>(
    text: &'a str,
    year: i32,
    classifier: &'a C,
) -> PageTransactions<'a, C> {
    PageTransactions {
        lines: text.lines().collect(),
        classifier,
        year,
        page: 1,
        cursor: 0,
        state: State::SeekingStart,
    }
}

impl<'a, C: LineClassifier> PageTransactions<'a, C> {
    /// Page number reported in errors (1-based).
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    fn seek_start(&mut self) -> State<'a> {
        match self.lines.iter().position(|l| self.classifier.is_section_start(l)) {
            Some(i) => {
                self.cursor = i + 1;
                State::InLedger
            }
            None => State::Done,
        }
    }

    fn step_ledger(&mut self) -> State<'a> {
        let Some(&line) = self.lines.get(self.cursor) else {
            return State::Done;
        };
        if self.classifier.is_section_end(line) {
            return State::Done;
        }
        let index = self.cursor;
        self.cursor += 1;

        let candidate = self.classifier.strip_leading_noise(line);
        match self.classifier.match_transaction(candidate) {
            Some(head)
                if !head.description.trim().is_empty()
                    && !self.classifier.is_opening_balance(head.description) =>
            {
                State::CollectingContinuation(Pending { index, head })
            }
            _ => State::InLedger,
        }
    }

    /// Absorb continuation lines after `pending`. Leaves the cursor on the
    /// line that stopped collection so the ledger state sees it next.
    fn collect(&mut self, pending: Pending<'a>) -> Result<TransactionRecord, TextError> {
        let mut description = pending.head.description.trim().to_string();
        while let Some(&raw) = self.lines.get(self.cursor) {
            let next = raw.trim();
            if next.is_empty()
                || self.classifier.has_date_token(next)
                || self.classifier.is_section_start(next)
                || self.classifier.is_section_end(next)
            {
                break;
            }
            self.cursor += 1;
            if self.classifier.is_reference_noise(next) {
                tracing::trace!(page = self.page, line = self.cursor, "dropped reference line");
                continue;
            }
            description.push(' ');
            description.push_str(next);
        }
        self.build(pending, description)
    }

    fn build(&self, pending: Pending<'a>, description: String) -> Result<TransactionRecord, TextError> {
        let line = pending.index + 1;
        let date = format_statement_date(pending.head.date, self.year).map_err(|source| {
            TextError::InvalidDate { page: self.page, line, source }
        })?;
        let amount = Money::parse(pending.head.amount).map_err(|source| {
            TextError::InvalidAmount { page: self.page, line, source }
        })?;
        Ok(TransactionRecord::new(date, description, Flow::from_signed(amount)))
    }
}

impl<'a, C: LineClassifier> Iterator for PageTransactions<'a, C> {
    type Item = Result<TransactionRecord, TextError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let state = std::mem::replace(&mut self.state, State::Done);
            self.state = match state {
                State::SeekingStart => self.seek_start(),
                State::InLedger => self.step_ledger(),
                State::CollectingContinuation(pending) => {
                    let result = self.collect(pending);
                    self.state = if result.is_ok() { State::InLedger } else { State::Done };
                    return Some(result);
                }
                State::Done => return None,
            };
        }
    }
}

/// Parse every page of a statement in order, stopping at the first hard
/// error.
pub fn parse_statement<C, I, S>(
    pages: I,
    year: i32,
    classifier: &C,
) -> Result<Vec<TransactionRecord>, TextError>
where
    C: LineClassifier,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    for (i, page) in pages.into_iter().enumerate() {
        let before = records.len();
        for record in parse_page(page.as_ref(), year, classifier).on_page(i + 1) {
            records.push(record?);
        }
        tracing::debug!(page = i + 1, found = records.len() - before, "text page parsed");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::StandardClassifier;
    use tally_core::Amount;

    fn parse(text: &str) -> Vec<TransactionRecord> {
        parse_page(text, 2024, &StandardClassifier)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn descriptions(records: &[TransactionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.description.as_str()).collect()
    }

    #[test]
    fn amazon_example() {
        let records = parse("Transaction Detail\nJan 5 AMAZON.COM PURCHASE -$42.10\n");
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.date, "1/5/2024");
        assert_eq!(r.description, "AMAZON.COM PURCHASE");
        assert_eq!(r.debit(), Some(&Amount::Value(Money::from_cents(4210))));
        assert_eq!(r.credit(), None);
        assert_eq!(r.check_number, None);
    }

    #[test]
    fn page_without_marker_is_empty() {
        assert!(parse("Jan 5 AMAZON.COM PURCHASE -$42.10\n").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn lines_before_marker_are_ignored() {
        let text = "Jan 1 HEADER NOISE $1.00\nTRANSACTION DETAIL\nJan 2 REAL ONE $2.00\n";
        assert_eq!(descriptions(&parse(text)), ["REAL ONE"]);
    }

    #[test]
    fn stops_at_ending_balance() {
        let text = "\
Transaction Detail
Jan 2 FIRST $2.00
Ending Balance $1,000.00
Jan 3 AFTER END $3.00
";
        assert_eq!(descriptions(&parse(text)), ["FIRST"]);
    }

    #[test]
    fn continuation_lines_are_merged() {
        let text = "\
Transaction Detail
Jan 2 ONLINE TRANSFER -$150.00 $850.00
TO SAVINGS XXXX1234
CONF 99812
Jan 3 DEPOSIT $20.00
";
        let records = parse(text);
        assert_eq!(
            descriptions(&records),
            ["ONLINE TRANSFER TO SAVINGS XXXX1234 CONF 99812", "DEPOSIT"]
        );
        assert_eq!(records[1].credit(), Some(&Amount::Value(Money::from_cents(2000))));
    }

    #[test]
    fn blank_line_ends_continuation() {
        let text = "\
Transaction Detail
Jan 2 CARD PURCHASE -$5.00
COFFEE SHOP

FOOTER TEXT THAT IS NOT A TRANSACTION
";
        assert_eq!(descriptions(&parse(text)), ["CARD PURCHASE COFFEE SHOP"]);
    }

    #[test]
    fn reference_id_line_is_dropped() {
        let text = "\
Transaction Detail
Jan 2 WIRE IN $500.00
ABCDEF0123456789XYZ
FROM ACME CORP
";
        assert_eq!(descriptions(&parse(text)), ["WIRE IN FROM ACME CORP"]);
    }

    #[test]
    fn beginning_balance_is_skipped() {
        let text = "\
Transaction Detail
Jan 1 Beginning Balance $1,000.00
Jan 2 FEE -$3.00
";
        assert_eq!(descriptions(&parse(text)), ["FEE"]);
    }

    #[test]
    fn beginning_balance_line_is_not_a_continuation() {
        let text = "\
Transaction Detail
Jan 1 PAYMENT -$10.00
Jan 1 Beginning Balance $1,000.00
";
        assert_eq!(descriptions(&parse(text)), ["PAYMENT"]);
    }

    #[test]
    fn qr_noise_before_date_is_trimmed() {
        let text = "Transaction Detail\n#@!x9 Mar3 CHECK 1042 STORE -$61.00\n";
        let records = parse(text);
        assert_eq!(records[0].date, "3/3/2024");
        assert_eq!(records[0].description, "CHECK 1042 STORE");
        assert_eq!(records[0].check_number.as_deref(), Some("1042"));
    }

    #[test]
    fn continuation_stops_at_section_end() {
        let text = "\
Transaction Detail
Jan 9 ATM WITHDRAWAL -$40.00
MAIN ST
Ending balance on Jan 31 $960.00
";
        assert_eq!(descriptions(&parse(text)), ["ATM WITHDRAWAL MAIN ST"]);
    }

    #[test]
    fn second_section_marker_stops_continuation() {
        let text = "\
Transaction Detail
Jan 9 FEE -$1.00
Transaction Detail (continued)
Jan 10 FEE -$2.00
";
        assert_eq!(descriptions(&parse(text)), ["FEE", "FEE"]);
    }

    #[test]
    fn zero_amount_has_no_flow() {
        let records = parse("Transaction Detail\nJan 2 ADJUSTMENT $0.00\n");
        assert_eq!(records[0].flow, None);
    }

    #[test]
    fn credit_and_debit_never_both_set() {
        let text = "\
Transaction Detail
Jan 2 A $1.00
Jan 3 B -$1.00
Jan 4 C $0.00
";
        for r in parse(text) {
            assert!(!(r.credit().is_some() && r.debit().is_some()));
        }
    }

    #[test]
    fn impossible_date_is_hard_error() {
        let mut it = parse_page("Transaction Detail\nFeb 30 BAD DAY -$1.00\nMar 1 OK $1.00\n", 2023, &StandardClassifier)
            .on_page(4);
        match it.next() {
            Some(Err(TextError::InvalidDate { page, line, .. })) => {
                assert_eq!(page, 4);
                assert_eq!(line, 2);
            }
            other => panic!("expected date error, got {other:?}"),
        }
        assert!(it.next().is_none());
    }

    #[test]
    fn unknown_month_is_hard_error() {
        let result: Result<Vec<_>, _> =
            parse_page("Transaction Detail\nAbc 3 THING $1.00\n", 2024, &StandardClassifier).collect();
        assert!(matches!(result, Err(TextError::InvalidDate { .. })));
    }

    #[test]
    fn iterator_is_lazy_and_restartable() {
        let text = "Transaction Detail\nJan 2 A $1.00\nJan 3 B $2.00\n";
        let mut it = parse_page(text, 2024, &StandardClassifier);
        assert_eq!(it.next().unwrap().unwrap().description, "A");
        let again: Vec<_> = parse_page(text, 2024, &StandardClassifier).collect();
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn statement_spans_pages() {
        let pages = [
            "Transaction Detail\nJan 2 A $1.00\n",
            "Disclaimer page with no ledger",
            "Transaction Detail\nJan 30 B -$2.00\nEnding Balance $0.00\n",
        ];
        let records = parse_statement(pages, 2024, &StandardClassifier).unwrap();
        assert_eq!(descriptions(&records), ["A", "B"]);
    }

    #[test]
    fn statement_error_names_page() {
        let pages = ["Transaction Detail\nJan 2 A $1.00\n", "Transaction Detail\nFeb 31 X $1.00\n"];
        let err = parse_statement(pages, 2024, &StandardClassifier).unwrap_err();
        assert!(matches!(err, TextError::InvalidDate { page: 2, .. }));
    }
}
