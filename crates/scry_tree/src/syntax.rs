//! Parser-independent syntax nodes.
//!
//! A `SyntaxNode` is the owned, immutable shape a parser hands to scry:
//! kind, byte span, the identifier name or raw literal text, and children in
//! source order. It is only an input format; everything downstream works on
//! the arena `Tree` built from it.

use serde_json::Value;

use crate::error::SyntaxError;
use crate::kind::{LabelPolicy, NodeKind};
use crate::span::Span;
use crate::stack::ensure_sufficient_stack;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    /// Identifier name, for identifier kinds.
    pub name: Option<String>,
    /// Raw source text, for literal kinds.
    pub raw: Option<String>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        SyntaxNode {
            kind,
            span,
            name: None,
            raw: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        ensure_sufficient_stack(|| 1 + self.children.iter().map(SyntaxNode::count).sum::<usize>())
    }

    /// Convert an ESTree JSON tree (acorn, espree, meriyah with
    /// `ranges`-style offsets) into syntax nodes.
    ///
    /// Every object field holding a node, or an array of nodes, becomes a
    /// child. Children are ordered by start offset. Unknown node types are
    /// rejected so that a parser upgrade cannot silently change tree shapes.
    pub fn from_estree(value: &Value) -> Result<SyntaxNode, SyntaxError> {
        convert(value).map_err(|e| e.within("$"))
    }
}

fn is_node(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

fn convert(value: &Value) -> Result<SyntaxNode, SyntaxError> {
    ensure_sufficient_stack(|| {
        let not_a_node = || SyntaxError::NotANode {
            path: String::new(),
        };
        let object = value.as_object().ok_or_else(not_a_node)?;
        let type_name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(not_a_node)?;
        let kind = NodeKind::from_estree_type(type_name).ok_or_else(|| SyntaxError::UnknownKind {
            kind: type_name.to_owned(),
            path: String::new(),
        })?;

        let offset = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
        };
        let span = match (offset("start"), offset("end")) {
            (Some(start), Some(end)) if start <= end => Span::new(start, end),
            _ => {
                return Err(SyntaxError::MissingSpan {
                    kind: kind.as_str(),
                    path: String::new(),
                })
            }
        };

        let mut node = SyntaxNode::new(kind, span);
        match kind.label_policy() {
            LabelPolicy::Identifier => {
                node.name = object.get("name").and_then(Value::as_str).map(str::to_owned);
            }
            LabelPolicy::Raw => {
                let raw = if kind == NodeKind::TemplateElement {
                    object.get("value").and_then(|v| v.get("raw"))
                } else {
                    object.get("raw")
                };
                node.raw = raw.and_then(Value::as_str).map(str::to_owned);
            }
            LabelPolicy::Unlabeled => {}
        }

        for (key, field) in object {
            match field {
                Value::Object(_) if is_node(field) => {
                    let child = convert(field).map_err(|e| e.within(&format!(".{key}")))?;
                    node.children.push(child);
                }
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate().filter(|(_, item)| is_node(item)) {
                        let child = convert(item).map_err(|e| e.within(&format!(".{key}[{i}]")))?;
                        node.children.push(child);
                    }
                }
                _ => {}
            }
        }
        node.children.sort_by_key(|child| child.span.start);

        Ok(node)
    })
}

#[cfg(test)]
mod tests;
