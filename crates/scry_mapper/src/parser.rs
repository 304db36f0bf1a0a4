//! The JavaScript parser seam.

use scry_tree::SyntaxNode;
use thiserror::Error;

/// Produces the syntax tree of a script version.
///
/// Any `Fn(&str) -> Result<SyntaxNode, ParseFailure>` is a parser.
pub trait ScriptParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<SyntaxNode, ParseFailure>;
}

impl<F> ScriptParser for F
where
    F: Fn(&str) -> Result<SyntaxNode, ParseFailure> + Send + Sync,
{
    fn parse(&self, text: &str) -> Result<SyntaxNode, ParseFailure> {
        self(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseFailure {
    message: String,
    /// Byte offset of the offending token, when known.
    pub offset: Option<u32>,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        ParseFailure {
            message: message.into(),
            offset: None,
        }
    }

    #[must_use]
    pub fn at(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
