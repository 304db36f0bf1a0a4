//! Node labels.
//!
//! Labels take part in the structural hash, so they decide which leaves
//! count as "the same". Identifiers are labeled with the name they have in
//! the original source whenever the script ships a source map, which keeps
//! minified names that change on every build from breaking matches.

use scry_sourcemap::{LineIndex, SourceMap, SourceMapError, SourceMappings};

use crate::kind::LabelPolicy;
use crate::syntax::SyntaxNode;

/// Assigns labels to syntax nodes of one script version.
#[derive(Debug, Default)]
pub struct Labeler<'a> {
    original: Option<OriginalText<'a>>,
}

#[derive(Debug)]
struct OriginalText<'a> {
    script: LineIndex<'a>,
    map: &'a SourceMap,
    mappings: SourceMappings,
    /// Line index per entry of `sourcesContent`.
    sources: Vec<Option<LineIndex<'a>>>,
}

fn is_identifier_char(c: char) -> bool {
    c == '$' || c == '_' || c == '#' || c.is_alphanumeric()
}

impl<'a> Labeler<'a> {
    /// Labels from the generated text only.
    pub fn plain() -> Self {
        Labeler { original: None }
    }

    /// Labels identifiers through `map`, which maps `script` to its sources.
    pub fn with_source_map(script: &'a str, map: &'a SourceMap) -> Result<Self, SourceMapError> {
        let mappings = map.decode_mappings()?;
        let sources = map
            .sources_content
            .as_ref()
            .map(|contents| {
                contents
                    .iter()
                    .map(|content| content.as_deref().map(LineIndex::new))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Labeler {
            original: Some(OriginalText {
                script: LineIndex::new(script),
                map,
                mappings,
                sources,
            }),
        })
    }

    /// Label of `node`, or `None` for kinds that carry no label.
    pub fn label(&self, node: &SyntaxNode) -> Option<String> {
        match node.kind.label_policy() {
            LabelPolicy::Identifier => self
                .original_identifier(node)
                .or_else(|| node.name.clone()),
            LabelPolicy::Raw => node.raw.clone(),
            LabelPolicy::Unlabeled => None,
        }
    }

    /// The original-source spelling of the identifier starting at `node`.
    ///
    /// Prefers the map's `names` entry for the segment; otherwise reads the
    /// identifier token at the original position from `sourcesContent`.
    fn original_identifier(&self, node: &SyntaxNode) -> Option<String> {
        let original = self.original.as_ref()?;
        let position = original.script.position(node.span.start)?;
        let Some(mapped) = original
            .mappings
            .map_generated_to_source(position.line, position.column)
        else {
            tracing::trace!(start = node.span.start, "identifier has no original position");
            return None;
        };

        if let Some(name) = mapped.name.and_then(|index| original.map.name(index)) {
            return Some(name.to_owned());
        }

        let source = original.sources.get(mapped.source as usize)?.as_ref()?;
        let offset = source.offset(mapped.line_column())? as usize;
        let rest = source.text().get(offset..)?;
        let token = &rest[..rest.find(|c| !is_identifier_char(c)).unwrap_or(rest.len())];
        (!token.is_empty()).then(|| token.to_owned())
    }
}
