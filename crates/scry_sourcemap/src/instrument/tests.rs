#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use super::*;

fn insert(start: u32, text: &str) -> Operation {
    Operation::Insert {
        start,
        text: text.to_owned(),
    }
}

fn delete(start: u32, end_before: u32) -> Operation {
    Operation::Delete { start, end_before }
}

#[test]
fn test_operations_from_json() {
    let ops: Vec<Operation> =
        serde_json::from_str(r#"[{"start":3,"text":"a()"},{"start":5,"endBefore":9}]"#).unwrap();
    assert_eq!(ops, vec![insert(3, "a()"), delete(5, 9)]);
}

#[test]
fn test_apply_operations() {
    let content = "f();\ng();";
    let ops = [insert(0, "c(1);"), delete(5, 9), insert(5, "h()")];
    assert_eq!(apply_operations(content, &ops), "c(1);f();\nh()");
}

#[test]
fn test_apply_operations_past_end() {
    assert_eq!(apply_operations("a", &[insert(10, "b")]), "ab");
}

#[test]
fn test_no_operations_is_identity() {
    let content = "var a;\nvar b;";
    let mappings = instrumentation_mappings(content, &[]);
    assert_eq!(apply_operations(content, &[]), content);
    for (line, column) in [(0, 0), (0, 4), (1, 5)] {
        assert_eq!(
            mappings.map_generated_to_source(line, column),
            Some(OriginalPosition::new(0, line, column))
        );
    }
}

#[test]
fn test_insert_shifts_columns() {
    // "c(1);f();"
    let mappings = instrumentation_mappings("f();", &[insert(0, "c(1);")]);
    assert_eq!(mappings.map_generated_to_source(0, 2), None);
    assert_eq!(
        mappings.map_generated_to_source(0, 5),
        Some(OriginalPosition::new(0, 0, 0))
    );
    assert_eq!(
        mappings.map_generated_to_source(0, 7),
        Some(OriginalPosition::new(0, 0, 2))
    );
}

#[test]
fn test_multiline_insert() {
    // "x\ny\nf();"
    let content = "f();";
    let ops = [insert(0, "x\ny\n")];
    assert_eq!(apply_operations(content, &ops), "x\ny\nf();");
    let mappings = instrumentation_mappings(content, &ops);
    assert_eq!(mappings.map_generated_to_source(0, 0), None);
    assert_eq!(mappings.map_generated_to_source(1, 0), None);
    assert_eq!(
        mappings.map_generated_to_source(2, 1),
        Some(OriginalPosition::new(0, 0, 1))
    );
}

#[test]
fn test_delete_skips_source() {
    // "ab" + "ef" from "abcdef"
    let mappings = instrumentation_mappings("abcdef", &[delete(2, 4)]);
    assert_eq!(
        mappings.map_generated_to_source(0, 1),
        Some(OriginalPosition::new(0, 0, 1))
    );
    assert_eq!(
        mappings.map_generated_to_source(0, 2),
        Some(OriginalPosition::new(0, 0, 4))
    );
}

#[test]
fn test_delete_across_lines() {
    // "a\nb\nc" minus "\nb" = "a\nc"
    let content = "a\nb\nc";
    let ops = [delete(1, 3)];
    assert_eq!(apply_operations(content, &ops), "a\nc");
    let mappings = instrumentation_mappings(content, &ops);
    assert_eq!(
        mappings.map_generated_to_source(1, 0),
        Some(OriginalPosition::new(0, 2, 0))
    );
}

#[test]
fn test_debug_source_map_without_original() {
    let map = debug_source_map("https://x/app.js", "f();", None, &[insert(0, "c();")]).unwrap();
    assert_eq!(map.sources, vec!["https://x/app.js"]);
    assert_eq!(map.source_content(0), Some("f();"));
    let mappings = map.decode_mappings().unwrap();
    assert_eq!(
        mappings.map_generated_to_source(0, 4),
        Some(OriginalPosition::new(0, 0, 0))
    );
}

#[test]
fn test_debug_source_map_rebases_original() {
    // served: "f();g();" built from two lines of app.ts
    let original = SourceMappings::decode("AAAA,IACA").unwrap();
    let json = format!(
        r#"{{"version":3,"sources":["app.ts"],"names":[],"mappings":"{}"}}"#,
        original.generate()
    );
    let map =
        debug_source_map("https://x/app.js", "f();g();", Some(&json), &[insert(4, "c();")])
            .unwrap();
    assert_eq!(map.sources, vec!["app.ts"]);
    // instrumented: "f();c();g();"
    let mappings = map.decode_mappings().unwrap();
    assert_eq!(
        mappings.map_generated_to_source(0, 1),
        Some(OriginalPosition::new(0, 0, 1))
    );
    assert_eq!(
        mappings.map_generated_to_source(0, 8),
        Some(OriginalPosition::new(0, 1, 0))
    );
}

#[test]
fn test_debug_source_map_bad_original() {
    let err = debug_source_map("u", "f();", Some(r#"{"version":2}"#), &[]).unwrap_err();
    assert!(matches!(err, SourceMapError::UnsupportedVersion(2)));
}
