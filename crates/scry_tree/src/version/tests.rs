#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use super::*;
use crate::label::Labeler;
use crate::node_id::NodeId;
use crate::testing::parse;

fn tree(source: &str) -> Tree {
    Tree::build(&parse(source).unwrap(), &Labeler::plain())
}

fn offset(source: &str, needle: &str) -> u32 {
    source.find(needle).unwrap() as u32
}

/// Innermost node starting at `position`.
fn innermost_at(tree: &Tree, position: u32) -> NodeId {
    tree.pre_order()
        .filter(|&id| tree.span(id).start == position)
        .last()
        .unwrap()
}

#[test]
fn test_renamed_variable_moves_return() {
    let old = "function f(x) {\n  return x + 1;\n}";
    let new = "// header\nfunction f(y) {\n  return y + 1;\n}";
    let mapper = VersionMapper::diff(&tree(old), &tree(new), &MatcherConfig::default());
    assert_eq!(
        mapper.map_position(offset(old, "return")),
        Some(offset(new, "return"))
    );
    assert_eq!(
        mapper.map_position_back(offset(new, "return")),
        Some(offset(old, "return"))
    );
    assert_eq!(mapper.map_position(offset(old, "x)")), Some(offset(new, "y)")));
}

#[test]
fn test_deleted_statement_does_not_map() {
    let old = "a(1);\nb(2);\nc(3);";
    let new = "a(1);\nc(3);";
    let mapper = VersionMapper::diff(&tree(old), &tree(new), &MatcherConfig::default());
    assert_eq!(mapper.map_position(offset(old, "b(2)")), None);
    assert_eq!(mapper.map_position(offset(old, "c(3)")), Some(offset(new, "c(3)")));
}

#[test]
fn test_unknown_offset_does_not_map() {
    let source = "f(1);";
    let mapper = VersionMapper::diff(&tree(source), &tree(source), &MatcherConfig::default());
    // inside the `1` literal, not a node start
    assert_eq!(mapper.map_position(1), None);
    assert_eq!(mapper.map_position(2), Some(2));
    assert_eq!(mapper.map_position(99), None);
}

#[test]
fn test_first_node_with_partner_wins() {
    let old = tree("a.b();");
    let new = tree("x; a.b();");
    // statement, call, member expression and `a` all start at 0
    let mut correspondence = Correspondence::new(old.len(), new.len());
    let a_old = innermost_at(&old, 0);
    let a_new = innermost_at(&new, 3);
    correspondence.link(a_old, a_new);
    assert_eq!(VersionMapper::new(&correspondence, &old, &new).map_position(0), Some(3));

    // the member expression comes first in pre-order
    let member_old = old.parent(a_old).unwrap();
    let x_new = innermost_at(&new, 0);
    correspondence.link(member_old, x_new);
    assert_eq!(VersionMapper::new(&correspondence, &old, &new).map_position(0), Some(0));
}

#[test]
fn test_root_is_not_indexed() {
    let (old, new) = (tree("f();"), tree("g(); f();"));
    let mut correspondence = Correspondence::new(old.len(), new.len());
    correspondence.link(old.root(), new.root());
    let mapper = VersionMapper::new(&correspondence, &old, &new);
    assert!(mapper.is_empty());
    assert_eq!(mapper.map_position(0), None);
}
