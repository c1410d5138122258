use chrono::NaiveDate;

use crate::date::parse_record_date;
use crate::transaction::TransactionRecord;

/// Stable ascending sort by record date. Dates that do not parse are
/// treated as the minimum date and therefore lead.
pub fn sort_by_date(records: &mut [TransactionRecord]) {
    records.sort_by_key(|r| parse_record_date(&r.date).unwrap_or(NaiveDate::MIN));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, desc: &str) -> TransactionRecord {
        TransactionRecord::new(date, desc, None)
    }

    fn descriptions(records: &[TransactionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.description.as_str()).collect()
    }

    #[test]
    fn sorts_chronologically() {
        let mut records = vec![rec("3/1/2024", "c"), rec("1/15/2024", "a"), rec("02/01/2024", "b")];
        sort_by_date(&mut records);
        assert_eq!(descriptions(&records), ["a", "b", "c"]);
    }

    #[test]
    fn malformed_date_sorts_first() {
        let mut records = vec![rec("1/2/2024", "valid"), rec("Jan 5", "broken"), rec("1/1/2024", "early")];
        sort_by_date(&mut records);
        assert_eq!(descriptions(&records), ["broken", "early", "valid"]);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let mut records = vec![rec("1/1/2024", "first"), rec("01/01/2024", "second"), rec("1/1/2024", "third")];
        sort_by_date(&mut records);
        assert_eq!(descriptions(&records), ["first", "second", "third"]);
    }
}
