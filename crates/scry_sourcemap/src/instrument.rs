//! Instrumentation edits and the map from instrumented code back to the
//! served script.
//!
//! Instrumenting a script is a list of edits against the served text. The
//! instrumented text is what runs in the browser, so stack traces and
//! debugger positions point into it; `debug_source_map` lets tools follow
//! those positions back to the served script, or through the script's own
//! map to its original sources.

use serde::{Deserialize, Serialize};

use crate::error::SourceMapError;
use crate::lines::{utf16_len, LineColumn};
use crate::map::SourceMap;
use crate::mappings::{GeneratedPosition, OriginalPosition, SourceMappings};

/// One edit against the served script. Offsets are bytes into the served
/// text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operation {
    /// Insert `text` before the character at `start`.
    Insert { start: u32, text: String },
    /// Remove `start..end_before`.
    Delete {
        start: u32,
        #[serde(rename = "endBefore")]
        end_before: u32,
    },
}

impl Operation {
    #[inline]
    pub fn start(&self) -> u32 {
        match self {
            Operation::Insert { start, .. } | Operation::Delete { start, .. } => *start,
        }
    }
}

/// Result of walking the served text through the edits.
struct Instrumented {
    text: String,
    mappings: SourceMappings,
}

/// Apply `operations` in start order (stable for equal starts).
///
/// Operations starting inside a deleted region apply where the deletion
/// ends. Operations starting past the end of `content` apply at the end.
fn instrument(content: &str, operations: &[Operation]) -> Instrumented {
    let mut ordered: Vec<&Operation> = operations.iter().collect();
    ordered.sort_by_key(|op| op.start());

    let mut text = String::with_capacity(content.len());
    let mut mappings = SourceMappings::new();
    let mut generated = GeneratedPosition::new(0, 0);
    let mut source = LineColumn::default();
    // set whenever the next served character starts a new run
    let mut fresh = true;

    let mut chars = content.char_indices().peekable();
    let mut ordered = ordered.into_iter().peekable();

    loop {
        let index = chars.peek().map(|(i, _)| *i);
        let due = ordered
            .next_if(|op| index.map_or(true, |index| op.start() as usize <= index));
        if let Some(op) = due {
            match op {
                Operation::Insert { text: inserted, .. } => {
                    for (i, line) in inserted.split('\n').enumerate() {
                        if i > 0 {
                            generated.line += 1;
                            generated.column = 0;
                        }
                        if !line.is_empty() {
                            mappings.add_mapping(generated, None);
                        }
                        generated.column += utf16_len(line);
                    }
                    text.push_str(inserted);
                }
                Operation::Delete { end_before, .. } => {
                    while let Some((_, ch)) = chars.next_if(|(i, _)| *i < *end_before as usize) {
                        advance(&mut source, ch);
                    }
                }
            }
            fresh = true;
            continue;
        }

        let Some((_, ch)) = chars.next() else {
            break;
        };
        if fresh {
            fresh = false;
            mappings.add_mapping(
                generated,
                Some(OriginalPosition::new(0, source.line, source.column)),
            );
        }
        text.push(ch);
        advance(&mut source, ch);
        if ch == '\n' {
            generated.line += 1;
            generated.column = 0;
            fresh = true;
        } else {
            generated.column += ch.len_utf16() as u32;
        }
    }

    Instrumented { text, mappings }
}

fn advance(position: &mut LineColumn, ch: char) {
    if ch == '\n' {
        position.line += 1;
        position.column = 0;
    } else {
        position.column += ch.len_utf16() as u32;
    }
}

/// The instrumented text.
pub fn apply_operations(content: &str, operations: &[Operation]) -> String {
    instrument(content, operations).text
}

/// Mappings from the instrumented text back to `content` (source 0).
///
/// Every run of served text gets one entry pointing at where it starts in
/// `content`; inserted text gets generated-only entries so lookups inside it
/// resolve to nothing.
pub fn instrumentation_mappings(content: &str, operations: &[Operation]) -> SourceMappings {
    instrument(content, operations).mappings
}

/// Source map for the instrumented version of a script.
///
/// With the script's own map, its mappings are rebased onto the
/// instrumentation mappings so that the result points straight at the
/// original sources. Without one, the result points at the served script,
/// which is embedded as the only source.
#[tracing::instrument(level = "debug", skip_all, fields(url = %url, operations = operations.len()))]
pub fn debug_source_map(
    url: &str,
    content: &str,
    original_map_json: Option<&str>,
    operations: &[Operation],
) -> Result<SourceMap, SourceMapError> {
    let instrumented = instrumentation_mappings(content, operations);
    match original_map_json {
        Some(json) => {
            let mut map = SourceMap::parse(json)?;
            let original = map.decode_mappings()?;
            map.mappings = original.rebase(&instrumented).generate();
            Ok(map)
        }
        None => {
            let mut map = SourceMap::for_source(url, Some(content.to_owned()));
            map.mappings = instrumented.generate();
            Ok(map)
        }
    }
}

#[cfg(test)]
mod tests;
