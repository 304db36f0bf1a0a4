//! Scry trees - labeled syntax trees and structural matching
//!
//! Turns one parsed version of a script into a read-only arena `Tree`,
//! matches two such trees, and answers where a symbol position of the old
//! version ended up in the new one.
//!
//! # Pipeline
//!
//! ```text
//! ESTree JSON ─► SyntaxNode ─► Tree (labels from Labeler) ─┐
//!                                                         ├─► match_trees ─► Correspondence ─► VersionMapper
//! ESTree JSON ─► SyntaxNode ─► Tree (labels from Labeler) ─┘
//! ```
//!
//! Parsing JavaScript is not done here. `SyntaxNode::from_estree` accepts
//! the output of any ESTree parser; the `testing` feature adds a small
//! parser for tests.

/// Compile-time size check for types stored once per node.
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod error;
mod kind;
mod label;
mod matcher;
mod node_id;
mod span;
mod stack;
mod syntax;
mod tree;
mod version;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::SyntaxError;
pub use kind::{LabelPolicy, NodeKind};
pub use label::Labeler;
pub use matcher::{match_trees, Correspondence, MatcherConfig};
pub use node_id::NodeId;
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use syntax::SyntaxNode;
pub use tree::Tree;
pub use version::VersionMapper;
