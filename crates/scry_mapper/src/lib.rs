//! Scry mapper - statement identities across script versions
//!
//! When a new version of a script is deployed, `ScriptVersionMapper`
//! diffs it against the preceding versions and carries every statement
//! set over to its new position. Later, when runtime data or commands for
//! a set have to be applied to some version, `map_existing_targets` finds
//! the set there, diffing as few versions as it can.
//!
//! Scripts, parsing and persistence are reached through traits:
//! `ScriptRepository`, `ScriptParser` and `scry_registry::MembershipStore`.

mod config;
mod cover;
mod diff_cache;
mod error;
mod mapper;
mod parser;
mod repository;

pub use config::MapperConfig;
pub use diff_cache::{DiffKey, DirectedMapper};
pub use error::MapperError;
pub use mapper::{NewVersionReport, ScriptVersionMapper, TargetMapping};
pub use parser::{ParseFailure, ScriptParser};
pub use repository::{
    InMemoryRepository, RepositoryError, ScriptContent, ScriptRecord, ScriptRepository,
};
