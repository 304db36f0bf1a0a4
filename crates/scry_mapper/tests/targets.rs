//! Finding existing statement sets in a chosen version.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use scry_mapper::{
    InMemoryRepository, MapperConfig, ParseFailure, ScriptContent, ScriptVersionMapper,
    TargetMapping,
};
use scry_registry::{InMemoryStore, MappingFailure, StatementSet};
use scry_tree::SyntaxNode;

type Parse = fn(&str) -> Result<SyntaxNode, ParseFailure>;
type Mapper = ScriptVersionMapper<InMemoryRepository, Parse, InMemoryStore>;

fn parse(text: &str) -> Result<SyntaxNode, ParseFailure> {
    scry_tree::testing::parse(text).map_err(|error| ParseFailure::new(error.message).at(error.offset))
}

fn mapper() -> Mapper {
    ScriptVersionMapper::new(
        InMemoryRepository::new(),
        parse as Parse,
        InMemoryStore::new(),
        MapperConfig::thorough(),
    )
}

fn offset(source: &str, needle: &str) -> u32 {
    source.find(needle).unwrap() as u32
}

#[test]
fn test_targets_found_in_unmapped_version() {
    let mapper = mapper();
    let v1_text = "a(1);\nb(2);\nc(3);";
    let v2_text = "// banner\na(1);\nc(3);";
    let v1 = mapper.repository().add("app.js", ScriptContent::new(v1_text));
    let a = mapper.registry().anchor(v1, offset(v1_text, "a(1)")).unwrap();
    let b = mapper.registry().anchor(v1, offset(v1_text, "b(2)")).unwrap();
    let v2 = mapper.repository().add("app.js", ScriptContent::new(v2_text));

    let targets: Vec<StatementSet> = [a, b]
        .iter()
        .map(|&set| mapper.registry().statement_set(set).unwrap())
        .collect();
    let results = mapper.map_existing_targets(v2, &targets).unwrap();
    assert_eq!(
        results,
        vec![
            TargetMapping::Success {
                position: offset(v2_text, "a(1)"),
                set: a,
                new: true,
            },
            TargetMapping::Failure { set: b },
        ]
    );
    assert_eq!(
        mapper.registry().store().all_failures(),
        vec![MappingFailure::new(v2, b)]
    );

    // the new membership and the failure are both remembered
    let targets: Vec<StatementSet> = [a, b]
        .iter()
        .map(|&set| mapper.registry().statement_set(set).unwrap())
        .collect();
    let results = mapper.map_existing_targets(v2, &targets).unwrap();
    assert_eq!(results[0].position(), Some(offset(v2_text, "a(1)")));
    assert!(matches!(results[0], TargetMapping::Success { new: false, .. }));
    assert_eq!(results[1], TargetMapping::Failure { set: b });
}

#[test]
fn test_targets_spread_over_versions() {
    let mapper = mapper();
    let v1_text = "one(1);\nshared(0);";
    let v2_text = "two(2);\nshared(0);";
    let v3_text = "shared(0);\ntwo(2);\none(1);";
    let v1 = mapper.repository().add("app.js", ScriptContent::new(v1_text));
    let v2 = mapper.repository().add("app.js", ScriptContent::new(v2_text));
    let v3 = mapper.repository().add("app.js", ScriptContent::new(v3_text));
    let one = mapper.registry().anchor(v1, 0).unwrap();
    let two = mapper.registry().anchor(v2, 0).unwrap();

    let targets = vec![
        mapper.registry().statement_set(one).unwrap(),
        mapper.registry().statement_set(two).unwrap(),
    ];
    let positions: Vec<Option<u32>> = mapper
        .map_existing_targets(v3, &targets)
        .unwrap()
        .iter()
        .map(TargetMapping::position)
        .collect();
    assert_eq!(
        positions,
        vec![Some(offset(v3_text, "one(1)")), Some(offset(v3_text, "two(2)"))]
    );
    assert_eq!(mapper.registry().members_of_script(v3).unwrap().len(), 2);
}

#[test]
fn test_empty_targets() {
    let mapper = mapper();
    let v1 = mapper.repository().add("app.js", ScriptContent::new("f();"));
    assert!(mapper.map_existing_targets(v1, &[]).unwrap().is_empty());
}

#[test]
fn test_abandoned_target_is_not_diffed() {
    let mapper = mapper();
    let full = "a(1);\nb(2);";
    let v1 = mapper.repository().add("app.js", ScriptContent::new(full));
    let b = mapper.registry().anchor(v1, offset(full, "b(2)")).unwrap();
    for _ in 0..3 {
        let version = mapper.repository().add("app.js", ScriptContent::new("a(1);"));
        let report = mapper.map_new_version(version).unwrap();
        assert_eq!(report.failures.len(), 1);
    }
    let v5 = mapper.repository().add("app.js", ScriptContent::new(full));
    assert!(mapper.registry().is_abandoned(b, v5).unwrap());

    let target = mapper.registry().statement_set(b).unwrap();
    let results = mapper.map_existing_targets(v5, &[target]).unwrap();
    assert_eq!(results, vec![TargetMapping::Failure { set: b }]);
    assert!(mapper.registry().members_of_script(v5).unwrap().is_empty());
}
