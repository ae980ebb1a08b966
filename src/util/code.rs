use once_cell::unsync::OnceCell;

use super::Position;

/// A wrapper around the input source text which lazily computes line-break
/// offsets so byte positions can be translated into [Position]s on demand —
/// only tokenizer failures and debug tracing ever pay for this.
pub struct Code<'c> {
    pub value: &'c str,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'c> Code<'c> {
    pub fn new(value: &'c str) -> Self {
        Self {
            value,
            line_breaks: OnceCell::new(),
        }
    }

    fn line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.value
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| if b == b'\n' { Some(i) } else { None })
                .collect()
        })
    }

    /// Translate a byte offset into the source into a 1-based line/column.
    pub fn position_at(&self, offset: usize) -> Position {
        let breaks = self.line_breaks();
        let line = breaks.partition_point(|&b| b < offset);
        let column_base = if line == 0 { 0 } else { breaks[line - 1] + 1 };
        Position::new(line + 1, offset - column_base + 1)
    }
}
