//! Decoded mappings with per-line lookup tables.
//!
//! `SourceMappings` keeps two indexes over the same entries:
//! - generated line → entries sorted by generated column
//! - (source, original line) → entries sorted by original column
//!
//! Lookups find the nearest entry at or before the queried column and
//! extrapolate the remaining column distance from it.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::SourceMapError;
use crate::lines::{LineColumn, LineIndex};
use crate::vlq;

/// Position in the generated file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratedPosition {
    pub line: u32,
    pub column: u32,
}

impl GeneratedPosition {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        GeneratedPosition { line, column }
    }
}

/// Position in one of the original sources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OriginalPosition {
    /// Index into `SourceMap::sources`.
    pub source: u32,
    pub line: u32,
    pub column: u32,
    /// Index into `SourceMap::names`.
    pub name: Option<u32>,
}

impl OriginalPosition {
    #[inline]
    pub const fn new(source: u32, line: u32, column: u32) -> Self {
        OriginalPosition {
            source,
            line,
            column,
            name: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_name(self, name: u32) -> Self {
        OriginalPosition {
            name: Some(name),
            ..self
        }
    }

    #[inline]
    pub const fn line_column(&self) -> LineColumn {
        LineColumn::new(self.line, self.column)
    }
}

/// One decoded segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub generated: GeneratedPosition,
    /// `None` for segments that only mark a generated position.
    pub original: Option<OriginalPosition>,
}

/// A run of generated text attributed to one segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratedRange {
    /// Byte offset of the first character.
    pub start: u32,
    /// Byte offset one past the last character.
    pub end: u32,
    /// Source the run came from, if any.
    pub source: Option<u32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct GeneratedEntry {
    column: u32,
    original: Option<OriginalPosition>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct SourceEntry {
    column: u32,
    generated: GeneratedPosition,
}

/// Decoded `mappings` with lookups in both directions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceMappings {
    generated_lines: BTreeMap<u32, Vec<GeneratedEntry>>,
    source_lines: FxHashMap<(u32, u32), Vec<SourceEntry>>,
}

/// Index of the last element whose key is `<= target`.
fn closest_at_or_before<T>(entries: &[T], target: u32, key: impl Fn(&T) -> u32) -> Option<usize> {
    entries
        .partition_point(|entry| key(entry) <= target)
        .checked_sub(1)
}

impl SourceMappings {
    pub fn new() -> Self {
        SourceMappings::default()
    }

    /// Decode a VLQ `mappings` string.
    pub fn decode(mappings: &str) -> Result<Self, SourceMapError> {
        let input = mappings.as_bytes();
        let mut result = SourceMappings::new();

        let mut pos = 0;
        let mut generated_line: u32 = 0;
        let mut previous_generated_column: i64 = 0;
        let mut previous_source: i64 = 0;
        let mut previous_line: i64 = 0;
        let mut previous_column: i64 = 0;
        let mut previous_name: i64 = 0;

        while pos < input.len() {
            match input[pos] {
                b';' => {
                    generated_line += 1;
                    previous_generated_column = 0;
                    pos += 1;
                }
                b',' => pos += 1,
                _ => {
                    let segment_start = pos;
                    let mut fields = [0i64; 5];
                    let mut count = 0;
                    while pos < input.len() && input[pos] != b',' && input[pos] != b';' {
                        if count == fields.len() {
                            return Err(SourceMapError::Segment {
                                offset: segment_start,
                                reason: "more than 5 fields",
                            });
                        }
                        fields[count] = vlq::decode(input, &mut pos)
                            .map_err(|source| SourceMapError::Vlq { offset: pos, source })?;
                        count += 1;
                    }

                    let field = |value: i64| {
                        u32::try_from(value).map_err(|_| SourceMapError::Segment {
                            offset: segment_start,
                            reason: "field out of range",
                        })
                    };

                    previous_generated_column += fields[0];
                    let generated =
                        GeneratedPosition::new(generated_line, field(previous_generated_column)?);
                    let original = match count {
                        1 => None,
                        4 | 5 => {
                            previous_source += fields[1];
                            previous_line += fields[2];
                            previous_column += fields[3];
                            let mut original = OriginalPosition::new(
                                field(previous_source)?,
                                field(previous_line)?,
                                field(previous_column)?,
                            );
                            if count == 5 {
                                previous_name += fields[4];
                                original = original.with_name(field(previous_name)?);
                            }
                            Some(original)
                        }
                        _ => {
                            return Err(SourceMapError::Segment {
                                offset: segment_start,
                                reason: "segments must have 1, 4 or 5 fields",
                            })
                        }
                    };
                    result.add_mapping(generated, original);
                }
            }
        }

        Ok(result)
    }

    /// Insert one entry, keeping both indexes sorted.
    ///
    /// Generated columns stay strictly ascending within a line: an entry at a
    /// column that is already present is dropped and `false` is returned.
    pub fn add_mapping(
        &mut self,
        generated: GeneratedPosition,
        original: Option<OriginalPosition>,
    ) -> bool {
        let line = self.generated_lines.entry(generated.line).or_default();
        let Err(slot) = line.binary_search_by_key(&generated.column, |e| e.column) else {
            return false;
        };
        line.insert(
            slot,
            GeneratedEntry {
                column: generated.column,
                original,
            },
        );

        if let Some(original) = original {
            let entries = self
                .source_lines
                .entry((original.source, original.line))
                .or_default();
            // Several generated places may come from one original column;
            // the earliest generated one stays the anchor.
            if let Err(slot) = entries.binary_search_by_key(&original.column, |e| e.column) {
                entries.insert(
                    slot,
                    SourceEntry {
                        column: original.column,
                        generated,
                    },
                );
            }
        }
        true
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.generated_lines.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.generated_lines.is_empty()
    }

    /// All entries in generated order.
    pub fn entries(&self) -> impl Iterator<Item = Mapping> + '_ {
        self.generated_lines.iter().flat_map(|(&line, entries)| {
            entries.iter().map(move |entry| Mapping {
                generated: GeneratedPosition::new(line, entry.column),
                original: entry.original,
            })
        })
    }

    /// Translate a generated position into the original source.
    ///
    /// Uses the nearest entry at or before `column` on the same line and
    /// carries the remaining distance over. Returns `None` when the line has
    /// no entry at or before `column`, or that entry has no original position.
    pub fn map_generated_to_source(&self, line: u32, column: u32) -> Option<OriginalPosition> {
        let entries = self.generated_lines.get(&line)?;
        let entry = entries[closest_at_or_before(entries, column, |e| e.column)?];
        let original = entry.original?;
        let delta = column - entry.column;
        Some(OriginalPosition {
            column: original.column.checked_add(delta)?,
            // a name only describes the exact token the entry points at
            name: original.name.filter(|_| delta == 0),
            ..original
        })
    }

    /// Translate an original position into the generated file.
    pub fn map_source_to_generated(
        &self,
        source: u32,
        line: u32,
        column: u32,
    ) -> Option<GeneratedPosition> {
        let entries = self.source_lines.get(&(source, line))?;
        let entry = entries[closest_at_or_before(entries, column, |e| e.column)?];
        let column = entry.generated.column.checked_add(column - entry.column)?;
        Some(GeneratedPosition::new(entry.generated.line, column))
    }

    /// Encode back into a VLQ `mappings` string.
    pub fn generate(&self) -> String {
        let mut out = String::new();
        let mut previous_source: i64 = 0;
        let mut previous_line: i64 = 0;
        let mut previous_column: i64 = 0;
        let mut previous_name: i64 = 0;
        let mut current_line = 0;

        for (&line, entries) in &self.generated_lines {
            while current_line < line {
                out.push(';');
                current_line += 1;
            }
            let mut previous_generated_column: i64 = 0;
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                vlq::encode(&mut out, i64::from(entry.column) - previous_generated_column);
                previous_generated_column = i64::from(entry.column);

                if let Some(original) = entry.original {
                    vlq::encode(&mut out, i64::from(original.source) - previous_source);
                    previous_source = i64::from(original.source);
                    vlq::encode(&mut out, i64::from(original.line) - previous_line);
                    previous_line = i64::from(original.line);
                    vlq::encode(&mut out, i64::from(original.column) - previous_column);
                    previous_column = i64::from(original.column);
                    if let Some(name) = original.name {
                        vlq::encode(&mut out, i64::from(name) - previous_name);
                        previous_name = i64::from(name);
                    }
                }
            }
        }
        out
    }

    /// Compose two maps.
    ///
    /// With `self` mapping an intermediate file B back to sources A, and
    /// `next` mapping a final file C back to B (B being source 0 of `next`),
    /// the result maps C back to A. Every entry of `self` is moved to the C
    /// position `next` assigns to its B position; entries whose B position
    /// has no C counterpart are dropped.
    pub fn rebase(&self, next: &SourceMappings) -> SourceMappings {
        let mut rebased = SourceMappings::new();
        for mapping in self.entries() {
            let intermediate = mapping.generated;
            if let Some(generated) =
                next.map_source_to_generated(0, intermediate.line, intermediate.column)
            {
                rebased.add_mapping(generated, mapping.original);
            }
        }
        rebased
    }

    /// Split `text` (the generated file) into one range per entry.
    ///
    /// Each range runs from its entry to the next entry on the same line, or
    /// to the end of the line. Entries on lines the text does not have are
    /// skipped; columns past a line end are clamped to it.
    pub fn generated_ranges(&self, text: &str) -> Vec<GeneratedRange> {
        let index = LineIndex::new(text);
        let mut ranges = Vec::with_capacity(self.len());
        for (&line, entries) in &self.generated_lines {
            let (Some(line_start), Some(line_text)) = (index.line_start(line), index.line_text(line))
            else {
                continue;
            };
            let line_end = line_start + line_text.len() as u32;
            let byte_at = |column: u32| {
                index
                    .offset(LineColumn::new(line, column))
                    .unwrap_or(line_end)
            };
            for (i, entry) in entries.iter().enumerate() {
                let end = entries.get(i + 1).map_or(line_end, |next| byte_at(next.column));
                ranges.push(GeneratedRange {
                    start: byte_at(entry.column),
                    end,
                    source: entry.original.map(|o| o.source),
                });
            }
        }
        ranges
    }

    /// Check that every entry fits inside the generated `text`.
    ///
    /// Catches maps uploaded for a different version of the script.
    pub fn validate_against(&self, text: &str) -> Result<(), SourceMapError> {
        let index = LineIndex::new(text);
        let line_count = index.line_count();
        for (&line, entries) in &self.generated_lines {
            let Some(line_end) = index.line_len_utf16(line) else {
                return Err(SourceMapError::LineOutOfRange { line, line_count });
            };
            if let Some(last) = entries.last() {
                if last.column > line_end {
                    return Err(SourceMapError::ColumnOutOfRange {
                        line,
                        column: last.column,
                        line_end,
                    });
                }
            }
        }
        Ok(())
    }
}
