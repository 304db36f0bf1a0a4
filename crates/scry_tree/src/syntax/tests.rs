#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

/// acorn output for `f(x, 1);`
fn call_statement() -> Value {
    json!({
        "type": "Program", "start": 0, "end": 8, "sourceType": "script",
        "body": [{
            "type": "ExpressionStatement", "start": 0, "end": 8,
            "expression": {
                "type": "CallExpression", "start": 0, "end": 7, "optional": false,
                "callee": { "type": "Identifier", "start": 0, "end": 1, "name": "f" },
                "arguments": [
                    { "type": "Identifier", "start": 2, "end": 3, "name": "x" },
                    { "type": "Literal", "start": 5, "end": 6, "value": 1, "raw": "1" }
                ]
            }
        }]
    })
}

#[test]
fn test_from_estree() {
    let node = SyntaxNode::from_estree(&call_statement()).unwrap();
    let expected = SyntaxNode::new(NodeKind::Program, Span::new(0, 8)).with_children(vec![
        SyntaxNode::new(NodeKind::ExpressionStatement, Span::new(0, 8)).with_children(vec![
            SyntaxNode::new(NodeKind::CallExpression, Span::new(0, 7)).with_children(vec![
                SyntaxNode::new(NodeKind::Identifier, Span::new(0, 1)).with_name("f"),
                SyntaxNode::new(NodeKind::Identifier, Span::new(2, 3)).with_name("x"),
                SyntaxNode::new(NodeKind::Literal, Span::new(5, 6)).with_raw("1"),
            ]),
        ]),
    ]);
    assert_eq!(node, expected);
    assert_eq!(node.count(), 6);
}

#[test]
fn test_children_follow_source_order() {
    // field order (alternate, consequent, test) differs from source order
    let value = json!({
        "type": "IfStatement", "start": 0, "end": 14,
        "test": { "type": "Identifier", "start": 4, "end": 5, "name": "t" },
        "consequent": { "type": "EmptyStatement", "start": 7, "end": 8 },
        "alternate": { "type": "EmptyStatement", "start": 13, "end": 14 }
    });
    let node = SyntaxNode::from_estree(&value).unwrap();
    let starts: Vec<_> = node.children.iter().map(|c| c.span.start).collect();
    assert_eq!(starts, vec![4, 7, 13]);
}

#[test]
fn test_template_element_raw() {
    let value = json!({
        "type": "TemplateLiteral", "start": 0, "end": 5,
        "expressions": [],
        "quasis": [{
            "type": "TemplateElement", "start": 1, "end": 4, "tail": true,
            "value": { "raw": "a\\n", "cooked": "a\n" }
        }]
    });
    let node = SyntaxNode::from_estree(&value).unwrap();
    assert_eq!(node.children[0].raw.as_deref(), Some("a\\n"));
}

#[test]
fn test_null_children_are_skipped() {
    let value = json!({
        "type": "ReturnStatement", "start": 0, "end": 7, "argument": null
    });
    let node = SyntaxNode::from_estree(&value).unwrap();
    assert!(node.children.is_empty());

    let value = json!({
        "type": "ArrayExpression", "start": 0, "end": 4,
        "elements": [null, { "type": "Literal", "start": 2, "end": 3, "raw": "1" }]
    });
    let node = SyntaxNode::from_estree(&value).unwrap();
    assert_eq!(node.children.len(), 1);
}

#[test]
fn test_unknown_kind_reports_path() {
    let value = json!({
        "type": "Program", "start": 0, "end": 5,
        "body": [{ "type": "JSXElement", "start": 0, "end": 5 }]
    });
    let err = SyntaxNode::from_estree(&value).unwrap_err();
    assert_eq!(
        err,
        SyntaxError::UnknownKind {
            kind: "JSXElement".to_owned(),
            path: "$.body[0]".to_owned(),
        }
    );
}

#[test]
fn test_missing_span() {
    let value = json!({ "type": "Identifier", "name": "x" });
    let err = SyntaxNode::from_estree(&value).unwrap_err();
    assert!(matches!(err, SyntaxError::MissingSpan { kind: "Identifier", .. }));

    let value = json!({ "type": "Identifier", "start": 5, "end": 2, "name": "x" });
    assert!(SyntaxNode::from_estree(&value).is_err());
}

#[test]
fn test_not_a_node() {
    let err = SyntaxNode::from_estree(&json!([1, 2])).unwrap_err();
    assert_eq!(
        err,
        SyntaxError::NotANode {
            path: "$".to_owned()
        }
    );
}
