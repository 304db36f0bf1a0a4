//! Scry registry - persistent statement identities
//!
//! A statement set names "the same statement" across the deployed versions
//! of a script. Each member is a symbol position (byte offset of the
//! statement start) in one version. When two sets turn out to hold the same
//! position they are merged into the smaller id.
//!
//! Storage is behind `MembershipStore`; `InMemoryStore` backs tests and the
//! command line.

mod config;
mod error;
mod failures;
mod ids;
mod merge;
mod registry;
mod store;

pub use config::RegistryConfig;
pub use error::{RegistryError, StoreError};
pub use ids::{MappingFailure, Member, ScriptId, StatementSet, StatementSetId};
pub use registry::{BatchUpdate, StatementSetRegistry};
pub use store::{InMemoryStore, MembershipStore, MembershipTxn};
