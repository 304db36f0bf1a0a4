use thiserror::Error;

/// Error converting parser output into `SyntaxNode`s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected an ESTree node object at {path}")]
    NotANode { path: String },

    #[error("unknown ESTree node type `{kind}` at {path}")]
    UnknownKind { kind: String, path: String },

    #[error("`{kind}` node at {path} has no valid `start`/`end` offsets")]
    MissingSpan { kind: &'static str, path: String },
}

impl SyntaxError {
    /// Prefix the error location with the path of an enclosing field.
    #[must_use]
    pub(crate) fn within(mut self, segment: &str) -> Self {
        match &mut self {
            SyntaxError::NotANode { path }
            | SyntaxError::UnknownKind { path, .. }
            | SyntaxError::MissingSpan { path, .. } => path.insert_str(0, segment),
        }
        self
    }
}
