//! `scry` subcommands.

mod diff;
mod sourcemap;

pub use diff::{diff_trees, parse_matcher_options};
pub use sourcemap::{debug_map, decode_map, discover_map, lookup, rebase_maps, source_ranges};

use scry_sourcemap::SourceMapError;
use scry_tree::SyntaxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Read(String),

    #[error(transparent)]
    SourceMap(#[from] SourceMapError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("invalid value for {flag}: `{value}`")]
    InvalidOption { flag: &'static str, value: String },

    #[error("unknown option `{0}`")]
    UnknownOption(String),
}

/// Read a whole file, with a message naming the path on failure.
pub fn read_file(path: &str) -> Result<String, CommandError> {
    std::fs::read_to_string(path).map_err(|e| {
        CommandError::Read(match e.kind() {
            std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
            std::io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
            std::io::ErrorKind::InvalidData => format!("'{path}' contains invalid UTF-8 data"),
            _ => format!("error reading '{path}': {e}"),
        })
    })
}

/// Parse the value of a `--flag=value` option.
fn option_value<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidOption {
        flag,
        value: value.to_owned(),
    })
}
