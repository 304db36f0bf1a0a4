//! Scry command-line tools
//!
//! Commands take file contents and return their output so that `main` is
//! the only place touching the file system and the process exit code.

pub mod commands;
pub mod tracing_setup;
