//! Source map commands: `decode`, `lookup`, `rebase`, `ranges`,
//! `debug-map` and `discover`.

use std::fmt::Write as _;

use scry_sourcemap::{
    debug_source_map, find_source_map_reference, Operation, OriginalPosition, SourceMap,
    SourceMapReference,
};

use super::CommandError;

fn original(map: &SourceMap, position: OriginalPosition) -> String {
    let source = map
        .sources
        .get(position.source as usize)
        .map_or("?", String::as_str);
    let mut out = format!("{source}:{}:{}", position.line, position.column);
    if let Some(name) = position.name.and_then(|index| map.name(index)) {
        let _ = write!(out, " ({name})");
    }
    out
}

/// Every entry of a map, one per line, in generated order.
pub fn decode_map(json: &str) -> Result<String, CommandError> {
    let map = SourceMap::parse(json)?;
    let mappings = map.decode_mappings()?;
    let mut out = String::new();
    for mapping in mappings.entries() {
        let generated = mapping.generated;
        let target = mapping
            .original
            .map_or_else(|| "-".to_owned(), |position| original(&map, position));
        let _ = writeln!(out, "{}:{} -> {target}", generated.line, generated.column);
    }
    let _ = writeln!(out, "{} entries", mappings.len());
    Ok(out)
}

/// Translate one position. Generated to original by default; `reverse`
/// goes from a position in source 0 to the generated file.
pub fn lookup(json: &str, line: u32, column: u32, reverse: bool) -> Result<String, CommandError> {
    let map = SourceMap::parse(json)?;
    let mappings = map.decode_mappings()?;
    let found = if reverse {
        mappings
            .map_source_to_generated(0, line, column)
            .map(|generated| format!("{}:{}", generated.line, generated.column))
    } else {
        mappings
            .map_generated_to_source(line, column)
            .map(|position| original(&map, position))
    };
    Ok(found.unwrap_or_else(|| "no mapping".to_owned()))
}

/// Compose two maps: `first` maps B back to A, `next` maps C back to B.
/// The result keeps `first`'s sources and maps C back to A.
pub fn rebase_maps(first_json: &str, next_json: &str) -> Result<String, CommandError> {
    let mut first = SourceMap::parse(first_json)?;
    let next = SourceMap::parse(next_json)?;
    let rebased = first.decode_mappings()?.rebase(&next.decode_mappings()?);
    tracing::debug!(entries = rebased.len(), "rebased mappings");
    first.mappings = rebased.generate();
    Ok(first.to_json()?)
}

/// Byte ranges of the generated `text` covered by each entry.
pub fn source_ranges(json: &str, text: &str) -> Result<String, CommandError> {
    let map = SourceMap::parse(json)?;
    let mappings = map.decode_mappings()?;
    mappings.validate_against(text)?;
    let mut out = String::new();
    for range in mappings.generated_ranges(text) {
        let source = range
            .source
            .and_then(|index| map.sources.get(index as usize))
            .map_or("-", String::as_str);
        let _ = writeln!(out, "{}..{} {source}", range.start, range.end);
    }
    Ok(out)
}

/// Source map of the instrumented script for the edits in
/// `operations_json`.
pub fn debug_map(
    url: &str,
    content: &str,
    operations_json: &str,
    original_map_json: Option<&str>,
) -> Result<String, CommandError> {
    let operations: Vec<Operation> = serde_json::from_str(operations_json)?;
    let map = debug_source_map(url, content, original_map_json, &operations)?;
    Ok(map.to_json()?)
}

/// Where the script's `sourceMappingURL` comment points.
pub fn discover_map(script: &str) -> Result<String, CommandError> {
    Ok(match find_source_map_reference(script)? {
        Some(SourceMapReference::Url(url)) => format!("url {url}"),
        Some(SourceMapReference::Inline(json)) => {
            // an inline map must at least parse
            SourceMap::parse(&json)?;
            format!("inline {json}")
        }
        None => "no source map reference".to_owned(),
    })
}
