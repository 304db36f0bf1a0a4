//! Byte offset ↔ line/column conversion.
//!
//! Lines are split on `\n` only. Columns count UTF-16 code units so they
//! agree with the columns stored in source maps.

/// Zero-based line and UTF-16 column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

impl LineColumn {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        LineColumn { line, column }
    }
}

/// Line start table for one text.
#[derive(Clone, Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the first character of every line.
    line_starts: Vec<u32>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = Vec::with_capacity(text.len() / 32 + 1);
        line_starts.push(0);
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        LineIndex { text, line_starts }
    }

    /// The indexed text.
    #[inline]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of lines; a trailing newline opens one more (empty) line.
    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Byte offset where `line` starts.
    #[inline]
    pub fn line_start(&self, line: u32) -> Option<u32> {
        self.line_starts.get(line as usize).copied()
    }

    /// Text of `line` without its terminating `\n`.
    pub fn line_text(&self, line: u32) -> Option<&'a str> {
        let start = self.line_start(line)? as usize;
        let end = self
            .line_start(line + 1)
            .map_or(self.text.len(), |next| next as usize - 1);
        self.text.get(start..end)
    }

    /// Length of `line` in UTF-16 code units.
    pub fn line_len_utf16(&self, line: u32) -> Option<u32> {
        self.line_text(line).map(utf16_len)
    }

    /// Line and column of a byte offset.
    ///
    /// Returns `None` past the end of the text or inside a multi-byte
    /// character.
    pub fn position(&self, offset: u32) -> Option<LineColumn> {
        if offset as usize > self.text.len() {
            return None;
        }
        let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let start = self.line_starts[line] as usize;
        let prefix = self.text.get(start..offset as usize)?;
        Some(LineColumn::new(line as u32, utf16_len(prefix)))
    }

    /// Byte offset of a line and column.
    ///
    /// Returns `None` when the line does not exist, the column lies beyond the
    /// end of the line, or the column splits a surrogate pair.
    pub fn offset(&self, position: LineColumn) -> Option<u32> {
        let start = self.line_start(position.line)?;
        let line = self.line_text(position.line)?;
        let mut units = 0;
        for (byte, ch) in line.char_indices() {
            if units == position.column {
                return Some(start + byte as u32);
            }
            if units > position.column {
                return None;
            }
            units += ch.len_utf16() as u32;
        }
        (units == position.column).then_some(start + line.len() as u32)
    }
}

pub(crate) fn utf16_len(text: &str) -> u32 {
    text.chars().map(|c| c.len_utf16() as u32).sum()
}

#[cfg(test)]
mod tests;
