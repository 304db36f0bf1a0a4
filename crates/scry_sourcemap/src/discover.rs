//! Locating a script's source map from its `sourceMappingURL` comment.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;

use crate::error::SourceMapError;

/// Trailing `//# sourceMappingURL=...` comment. The legacy `//@` form is
/// accepted too.
#[expect(clippy::unwrap_used, reason = "pattern is a literal")]
static SOURCE_MAPPING_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//[#@]\s*sourceMappingURL=[ \t]*(\S*)\s*$").unwrap());

#[expect(clippy::unwrap_used, reason = "pattern is a literal")]
static INLINE_MAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:application/json;(?:charset=utf-8;)?base64,(\S*)$").unwrap()
});

/// Where a script says its source map lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceMapReference {
    /// The decoded JSON of a `data:` URL.
    Inline(String),
    /// A URL (usually relative to the script) to fetch.
    Url(String),
}

/// Find the source map reference at the end of `script`.
///
/// Returns `Ok(None)` when the script has no trailing reference.
pub fn find_source_map_reference(
    script: &str,
) -> Result<Option<SourceMapReference>, SourceMapError> {
    let Some(url) = SOURCE_MAPPING_URL
        .captures(script)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
    else {
        return Ok(None);
    };

    let Some(payload) = INLINE_MAP.captures(url).and_then(|c| c.get(1)) else {
        return Ok(Some(SourceMapReference::Url(url.to_owned())));
    };
    let bytes = STANDARD
        .decode(payload.as_str())
        .map_err(|e| SourceMapError::InlineEncoding(e.to_string()))?;
    let json = String::from_utf8(bytes).map_err(|e| SourceMapError::InlineEncoding(e.to_string()))?;
    Ok(Some(SourceMapReference::Inline(json)))
}

#[cfg(test)]
mod tests;
