//! Mapper errors.

use scry_registry::{RegistryError, ScriptId};
use scry_sourcemap::SourceMapError;
use thiserror::Error;

use crate::parser::ParseFailure;
use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum MapperError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to parse script {script}: {source}")]
    Parse {
        script: ScriptId,
        source: ParseFailure,
    },

    #[error("unusable source map for script {script}: {source}")]
    SourceMap {
        script: ScriptId,
        source: SourceMapError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
