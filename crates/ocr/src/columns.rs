use tally_core::{ColumnRanges, PixelRange};

use crate::types::ColumnKind;

/// Horizontal pixel bands of the ledger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBands {
    pub date: PixelRange,
    pub description: PixelRange,
    pub credit: PixelRange,
    pub debit: PixelRange,
}

impl ColumnBands {
    /// Band containing `x`, checked Date, Description, Credit, Debit in that
    /// order. Bands are inclusive at both ends.
    pub fn classify(&self, x: i32) -> Option<ColumnKind> {
        [
            (self.date, ColumnKind::Date),
            (self.description, ColumnKind::Description),
            (self.credit, ColumnKind::Credit),
            (self.debit, ColumnKind::Debit),
        ]
        .into_iter()
        .find(|(band, _)| band.contains(x))
        .map(|(_, kind)| kind)
    }
}

impl From<ColumnRanges> for ColumnBands {
    fn from(r: ColumnRanges) -> Self {
        Self { date: r.date, description: r.description, credit: r.credit, debit: r.debit }
    }
}

impl Default for ColumnBands {
    fn default() -> Self {
        ColumnRanges::default().into()
    }
}
