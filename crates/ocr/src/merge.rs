use tally_core::{format_with_year, Amount, Flow, TransactionRecord};

use crate::types::{append_spaced, OcrRow};

/// Fold wrapped description rows into the row above them.
///
/// A continuation row with nothing above it on the page is kept as is so
/// the document can attach it to the previous page.
pub fn merge_continuations(rows: Vec<OcrRow>) -> Vec<OcrRow> {
    let mut merged: Vec<OcrRow> = Vec::with_capacity(rows.len());
    for row in rows {
        if row.is_continuation() {
            if let Some(prev) = merged.last_mut() {
                append_spaced(&mut prev.description, &row.description);
                continue;
            }
        }
        merged.push(row);
    }
    merged
}

fn is_misplaced_amount(text: &str) -> bool {
    if text.is_empty() || text.starts_with('$') {
        return false;
    }
    let upper = text.to_uppercase();
    !upper.contains("DEPOSIT") && !upper.contains("WITHDRAWAL")
}

/// Move description words that drifted into an amount band back into the
/// description.
pub fn repair_columns(row: &mut OcrRow) {
    if is_misplaced_amount(&row.credit) {
        let text = std::mem::take(&mut row.credit);
        append_spaced(&mut row.description, &text);
    }
    if is_misplaced_amount(&row.debit) {
        let text = std::mem::take(&mut row.debit);
        append_spaced(&mut row.description, &text);
    }
}

/// Rows of a whole statement, accumulated page by page.
#[derive(Debug, Default)]
pub struct StatementRows {
    rows: Vec<OcrRow>,
}

impl StatementRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one page of rows: merge continuations, repair columns, then join
    /// a leading wrapped line onto the last row of the previous page.
    pub fn push_page(&mut self, rows: Vec<OcrRow>) {
        let mut rows = merge_continuations(rows);
        rows.iter_mut().for_each(repair_columns);

        let carries_over = rows
            .first()
            .is_some_and(|first| first.is_continuation() && !first.has_amount());
        if carries_over {
            if let Some(last) = self.rows.last_mut() {
                let first = rows.remove(0);
                append_spaced(&mut last.description, &first.description);
            }
        }
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[OcrRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert to records dated in `year`. Rows without description are
    /// dropped.
    pub fn into_records(self, year: i32) -> Vec<TransactionRecord> {
        self.rows.into_iter().filter_map(|row| to_record(row, year)).collect()
    }
}

fn to_record(row: OcrRow, year: i32) -> Option<TransactionRecord> {
    if row.description.trim().is_empty() {
        tracing::debug!(date = %row.date, credit = %row.credit, debit = %row.debit, "dropping row without description");
        return None;
    }
    let flow = match (row.credit.is_empty(), row.debit.is_empty()) {
        (true, true) => None,
        (false, true) => Some(Flow::Credit(Amount::Raw(row.credit))),
        (true, false) => Some(Flow::Debit(Amount::Raw(row.debit))),
        (false, false) => {
            tracing::warn!(
                description = %row.description,
                credit = %row.credit,
                debit = %row.debit,
                "row has both credit and debit, keeping credit"
            );
            Some(Flow::Credit(Amount::Raw(row.credit)))
        }
    };
    Some(TransactionRecord::new(format_with_year(&row.date, year), row.description.trim(), flow))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, description: &str, credit: &str, debit: &str) -> OcrRow {
        OcrRow {
            date: date.into(),
            description: description.into(),
            credit: credit.into(),
            debit: debit.into(),
        }
    }

    #[test]
    fn continuation_appends_to_previous_row() {
        let rows = vec![
            row("01/05", "ONLINE TRANSFER", "", "$50.00"),
            row("", "TO SAVINGS", "", ""),
            row("", "REF 123", "", ""),
            row("01/06", "DEPOSIT", "$10.00", ""),
        ];
        let merged = merge_continuations(rows);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].description, "ONLINE TRANSFER TO SAVINGS REF 123");
    }

    #[test]
    fn leading_continuation_is_kept() {
        let merged = merge_continuations(vec![row("", "WRAPPED", "", ""), row("01/02", "X", "", "")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].description, "WRAPPED");
    }

    #[test]
    fn repair_moves_text_out_of_amount_bands() {
        let mut r = row("01/05", "PAYMENT TO", "VENDOR", "INC");
        repair_columns(&mut r);
        assert_eq!(r.description, "PAYMENT TO VENDOR INC");
        assert!(r.credit.is_empty());
        assert!(r.debit.is_empty());
    }

    #[test]
    fn repair_keeps_dollar_amounts_and_keywords() {
        let mut r = row("01/05", "X", "$12.00", "Withdrawals");
        repair_columns(&mut r);
        assert_eq!(r.description, "X");
        assert_eq!(r.credit, "$12.00");
        assert_eq!(r.debit, "Withdrawals");

        let mut r = row("01/05", "X", "deposit", "");
        repair_columns(&mut r);
        assert_eq!(r.credit, "deposit");
    }

    #[test]
    fn page_leading_wrap_joins_previous_page() {
        let mut doc = StatementRows::new();
        doc.push_page(vec![row("01/30", "WIRE FROM", "$100.00", "")]);
        doc.push_page(vec![row("", "ACME CORP", "", ""), row("02/01", "FEE", "", "$2.00")]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.rows()[0].description, "WIRE FROM ACME CORP");
        assert_eq!(doc.rows()[1].description, "FEE");
    }

    #[test]
    fn leading_wrap_with_amount_stays() {
        let mut doc = StatementRows::new();
        doc.push_page(vec![row("01/30", "A", "$1.00", "")]);
        doc.push_page(vec![row("", "B", "$2.00", "")]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.rows()[0].description, "A");
    }

    #[test]
    fn first_page_wrap_has_nothing_to_join() {
        let mut doc = StatementRows::new();
        doc.push_page(vec![row("", "ORPHAN", "", "")]);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn records_keep_raw_amounts_and_pad_dates() {
        let mut doc = StatementRows::new();
        doc.push_page(vec![
            row("1/5", "PAYROLL", "$1,200.00", ""),
            row("01/06", "CHECK 1042", "", "$61.00"),
            row("01/07", "", "$5.00", ""),
            row("garbled", "NOTE", "", ""),
        ]);
        let records = doc.into_records(2024);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, "01/05/2024");
        assert_eq!(records[0].credit(), Some(&Amount::Raw("$1,200.00".into())));
        assert_eq!(records[1].debit(), Some(&Amount::Raw("$61.00".into())));
        assert_eq!(records[1].check_number.as_deref(), Some("1042"));
        assert_eq!(records[2].date, "garbled");
        assert_eq!(records[2].flow, None);
    }

    #[test]
    fn both_amounts_keep_credit() {
        let mut doc = StatementRows::new();
        doc.push_page(vec![row("01/05", "ODD", "$1.00", "$2.00")]);
        let records = doc.into_records(2024);
        assert_eq!(records[0].credit(), Some(&Amount::Raw("$1.00".into())));
        assert_eq!(records[0].debit(), None);
    }
}
