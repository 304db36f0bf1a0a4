//! The source map v3 JSON document.

use serde::{Deserialize, Serialize};

use crate::error::SourceMapError;
use crate::mappings::SourceMappings;

/// Prefix some servers put in front of JSON responses to defeat XSSI.
const XSSI_PREFIX: &str = ")]}";

/// A parsed v3 source map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

/// Loose shape used to report version and section problems before the
/// strict fields are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
    version: i64,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    source_root: Option<String>,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    names: Vec<String>,
    #[serde(default)]
    mappings: Option<String>,
    #[serde(default)]
    sections: Option<serde_json::Value>,
}

impl SourceMap {
    /// Parse a JSON source map.
    ///
    /// Only version 3 without `sections` is accepted.
    pub fn parse(json: &str) -> Result<Self, SourceMapError> {
        let json = json.trim_start();
        let json = json.strip_prefix(XSSI_PREFIX).unwrap_or(json);
        let raw: RawSourceMap = serde_json::from_str(json)?;

        if raw.version != 3 {
            return Err(SourceMapError::UnsupportedVersion(raw.version));
        }
        if raw.sections.is_some() {
            return Err(SourceMapError::UnsupportedSections);
        }
        let mappings = raw.mappings.ok_or(SourceMapError::MissingMappings)?;

        Ok(SourceMap {
            version: 3,
            file: raw.file,
            source_root: raw.source_root,
            sources: raw.sources,
            sources_content: raw.sources_content,
            names: raw.names,
            mappings,
        })
    }

    /// A map for `source` with no mappings yet.
    pub fn for_source(source: impl Into<String>, content: Option<String>) -> Self {
        SourceMap {
            version: 3,
            file: None,
            source_root: None,
            sources: vec![source.into()],
            sources_content: Some(vec![content]),
            names: Vec::new(),
            mappings: String::new(),
        }
    }

    /// Serialize back to compact JSON.
    pub fn to_json(&self) -> Result<String, SourceMapError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode the `mappings` field.
    pub fn decode_mappings(&self) -> Result<SourceMappings, SourceMapError> {
        SourceMappings::decode(&self.mappings)
    }

    /// Embedded content of source `index`, if the map carries it.
    pub fn source_content(&self, index: u32) -> Option<&str> {
        self.sources_content
            .as_ref()?
            .get(index as usize)?
            .as_deref()
    }

    /// Name at `index` in `names`.
    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }
}
