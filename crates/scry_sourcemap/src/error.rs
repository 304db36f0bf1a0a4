use thiserror::Error;

use crate::vlq::VlqError;

/// Error produced while reading or validating a source map.
///
/// All of these are hard failures: nothing is partially parsed.
#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported source map version {0}")]
    UnsupportedVersion(i64),

    #[error("sectioned source maps are not supported")]
    UnsupportedSections,

    #[error("source map has no `mappings` field")]
    MissingMappings,

    #[error("invalid mappings at byte {offset}: {source}")]
    Vlq {
        offset: usize,
        #[source]
        source: VlqError,
    },

    #[error("invalid mappings segment at byte {offset}: {reason}")]
    Segment { offset: usize, reason: &'static str },

    #[error("inline source map is not valid base64 UTF-8 JSON: {0}")]
    InlineEncoding(String),

    #[error("mappings reference line {line} but the script has {line_count} lines")]
    LineOutOfRange { line: u32, line_count: u32 },

    #[error("mapping on line {line} references column {column} but the line ends at column {line_end}")]
    ColumnOutOfRange {
        line: u32,
        column: u32,
        line_end: u32,
    },
}
