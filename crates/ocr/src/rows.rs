use tally_core::PixelRange;

use crate::columns::ColumnBands;
use crate::types::{OcrRow, WordBox};

struct Cluster<'a> {
    y: i32,
    words: Vec<&'a WordBox>,
}

/// Cluster words into visual rows.
///
/// Whitespace-only words and words whose `y` lies outside `band` are
/// dropped. Each word joins the first existing row whose representative `y`
/// (its first word's) is within `tolerance`; otherwise it opens a new row.
/// Rows come back ordered top to bottom, words in discovery order.
pub fn group_rows<'a>(words: &'a [WordBox], band: PixelRange, tolerance: i32) -> Vec<Vec<&'a WordBox>> {
    let mut clusters: Vec<Cluster<'a>> = Vec::new();
    for word in words {
        if word.text.trim().is_empty() || !band.contains(word.y) {
            continue;
        }
        match clusters.iter_mut().find(|c| (c.y - word.y).abs() <= tolerance) {
            Some(cluster) => cluster.words.push(word),
            None => clusters.push(Cluster { y: word.y, words: vec![word] }),
        }
    }
    clusters.sort_by_key(|c| c.y);
    clusters.into_iter().map(|c| c.words).collect()
}

/// Split one clustered row into column slots. Words outside every band are
/// dropped.
pub fn assign_columns(words: &[&WordBox], bands: &ColumnBands) -> OcrRow {
    let mut row = OcrRow::default();
    for word in words {
        if let Some(kind) = bands.classify(word.x) {
            row.push(kind, word.text.trim());
        }
    }
    row
}

/// Words of one page to table rows, without header or empty rows.
pub fn build_rows(words: &[WordBox], band: PixelRange, tolerance: i32, bands: &ColumnBands) -> Vec<OcrRow> {
    group_rows(words, band, tolerance)
        .iter()
        .map(|cluster| assign_columns(cluster, bands))
        .filter(|row| !row.is_empty() && !row.is_header())
        .collect()
}
