#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::*;

#[test]
fn test_url_reference() {
    let script = "f();\n//# sourceMappingURL=app.js.map\n";
    assert_eq!(
        find_source_map_reference(script).unwrap(),
        Some(SourceMapReference::Url("app.js.map".to_owned()))
    );
}

#[test]
fn test_legacy_marker() {
    let script = "f();\n//@ sourceMappingURL=app.js.map";
    assert_eq!(
        find_source_map_reference(script).unwrap(),
        Some(SourceMapReference::Url("app.js.map".to_owned()))
    );
}

#[test]
fn test_inline_reference() {
    let json = r#"{"version":3,"sources":[],"mappings":""}"#;
    let script = format!(
        "f();\n//# sourceMappingURL=data:application/json;base64,{}",
        STANDARD.encode(json)
    );
    assert_eq!(
        find_source_map_reference(&script).unwrap(),
        Some(SourceMapReference::Inline(json.to_owned()))
    );
}

#[test]
fn test_inline_reference_with_charset() {
    let script = format!(
        "//# sourceMappingURL=data:application/json;charset=utf-8;base64,{}",
        STANDARD.encode("{}")
    );
    assert_eq!(
        find_source_map_reference(&script).unwrap(),
        Some(SourceMapReference::Inline("{}".to_owned()))
    );
}

#[test]
fn test_reference_must_be_trailing() {
    let script = "//# sourceMappingURL=app.js.map\nf();";
    assert_eq!(find_source_map_reference(script).unwrap(), None);
}

#[test]
fn test_no_reference() {
    assert_eq!(find_source_map_reference("f();").unwrap(), None);
    assert_eq!(
        find_source_map_reference("//# sourceMappingURL=").unwrap(),
        None
    );
}

#[test]
fn test_bad_inline_payload() {
    let script = "//# sourceMappingURL=data:application/json;base64,@@@@";
    assert!(matches!(
        find_source_map_reference(script),
        Err(SourceMapError::InlineEncoding(_))
    ));
}
