/// One recognized word and the top-left corner of its bounding box, in
/// pixels on a single rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBox {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

impl WordBox {
    pub fn new(text: impl Into<String>, x: i32, y: i32) -> Self {
        Self { text: text.into(), x, y }
    }
}

/// Horizontal band a word falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Date,
    Description,
    Credit,
    Debit,
}

/// A visual row split into its four column slots. Empty string means no
/// word landed in that band.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrRow {
    pub date: String,
    pub description: String,
    pub credit: String,
    pub debit: String,
}

impl OcrRow {
    pub fn slot_mut(&mut self, kind: ColumnKind) -> &mut String {
        match kind {
            ColumnKind::Date => &mut self.date,
            ColumnKind::Description => &mut self.description,
            ColumnKind::Credit => &mut self.credit,
            ColumnKind::Debit => &mut self.debit,
        }
    }

    /// Append `text` to a slot, space-separated.
    pub fn push(&mut self, kind: ColumnKind, text: &str) {
        append_spaced(self.slot_mut(kind), text);
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
            && self.description.is_empty()
            && self.credit.is_empty()
            && self.debit.is_empty()
    }

    /// The column-title row printed at the top of each ledger page.
    pub fn is_header(&self) -> bool {
        self.date.eq_ignore_ascii_case("DATE")
            && self.description.to_ascii_uppercase().contains("DESCRIPTION")
    }

    /// Wrapped description text belonging to the row above.
    pub fn is_continuation(&self) -> bool {
        self.date.is_empty() && !self.description.is_empty()
    }

    pub fn has_amount(&self) -> bool {
        !self.credit.is_empty() || !self.debit.is_empty()
    }
}

pub(crate) fn append_spaced(target: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}
