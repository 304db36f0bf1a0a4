//! Registry errors.

use thiserror::Error;

use crate::ids::StatementSetId;

/// A failure reported by a `MembershipStore`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("membership store: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The store failed; the batch was rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("statement set {0} has no members")]
    UnknownSet(StatementSetId),
}
