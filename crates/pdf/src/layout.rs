use lopdf::content::Operation;
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;

/// TJ displacement (thousandths of an em) wide enough to read as a space.
const WORD_GAP: f32 = -100.0;

// ── Line builder ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct Lines {
    done: Vec<String>,
    current: String,
    /// Vertical origin of the last `Tm`, to tell a new row from a new column.
    matrix_y: Option<f32>,
}

impl Lines {
    fn push_text(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn space(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
    }

    fn break_line(&mut self) {
        let line = self.current.trim_end();
        if !line.is_empty() {
            self.done.push(line.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        let mut text = self.done.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

fn number(op: &Operation, index: usize) -> f32 {
    op.operands.get(index).and_then(|o| o.as_float().ok()).unwrap_or(0.0)
}

fn show(lines: &mut Lines, encoding: Option<&Encoding>, operand: &Object) -> lopdf::Result<()> {
    let Some(encoding) = encoding else {
        tracing::debug!("text shown without a decodable font, skipping");
        return Ok(());
    };
    match operand {
        Object::String(bytes, _) => lines.push_text(&Document::decode_text(encoding, bytes)?),
        Object::Array(items) => {
            for item in items {
                match item {
                    Object::String(bytes, _) => lines.push_text(&Document::decode_text(encoding, bytes)?),
                    Object::Integer(_) | Object::Real(_) if item.as_float().unwrap_or(0.0) < WORD_GAP => lines.space(),
                    _ => {}
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Text of one page with one output line per text row.
///
/// Rows are split on the positioning operators (`Td`, `TD`, `T*`, `'`, `"`,
/// a `Tm` that moves vertically) as well as on text object boundaries, so a
/// statement that lays out its whole ledger inside a single `BT`…`ET` block
/// still reads back line by line.
pub(crate) fn page_lines(doc: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(doc).map(|encoding| (name, encoding)))
        .collect::<lopdf::Result<BTreeMap<Vec<u8>, Encoding>>>()?;
    let content = doc.get_and_decode_page_content(page_id)?;

    let mut lines = Lines::default();
    let mut encoding = None;
    for op in &content.operations {
        match op.operator.as_str() {
            "BT" | "ET" | "T*" => lines.break_line(),
            "Tf" => {
                encoding = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Td" | "TD" => {
                if number(op, 1) != 0.0 {
                    lines.break_line();
                } else {
                    lines.space();
                }
            }
            "Tm" => {
                let y = number(op, 5);
                if lines.matrix_y.is_some_and(|prev| prev != y) {
                    lines.break_line();
                } else {
                    lines.space();
                }
                lines.matrix_y = Some(y);
            }
            "Tj" | "TJ" => {
                if let Some(operand) = op.operands.first() {
                    show(&mut lines, encoding, operand)?;
                }
            }
            "'" => {
                lines.break_line();
                if let Some(operand) = op.operands.first() {
                    show(&mut lines, encoding, operand)?;
                }
            }
            "\"" => {
                lines.break_line();
                if let Some(operand) = op.operands.get(2) {
                    show(&mut lines, encoding, operand)?;
                }
            }
            _ => {}
        }
    }
    Ok(lines.finish())
}
