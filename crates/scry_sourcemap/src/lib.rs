//! Scry source maps - the position translation layer
//!
//! This crate contains everything scry needs to move positions between the
//! different texts a deployed script exists as:
//! - The VLQ codec for the `mappings` field
//! - `SourceMap`, the v3 JSON document
//! - `SourceMappings`, the decoded per-line lookup tables with nearest-entry
//!   interpolation, rebasing and range splitting
//! - `LineIndex` for byte offset ↔ line/column conversion
//! - The instrumentation map that relates instrumented code to the script
//!   that was served to us
//!
//! # Coordinates
//!
//! Lines are zero-based. Columns are zero-based UTF-16 code unit offsets,
//! as required by the source map format. Byte offsets (symbol positions)
//! are only used at the edges: `LineIndex` and `generated_ranges`.

mod discover;
mod error;
mod instrument;
mod lines;
mod map;
mod mappings;
pub mod vlq;

pub use discover::{find_source_map_reference, SourceMapReference};
pub use error::SourceMapError;
pub use instrument::{apply_operations, debug_source_map, instrumentation_mappings, Operation};
pub use lines::{LineColumn, LineIndex};
pub use map::SourceMap;
pub use mappings::{
    GeneratedPosition, GeneratedRange, Mapping, OriginalPosition, SourceMappings,
};
pub use vlq::VlqError;
