#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::store::{InMemoryStore, MembershipTxn};

fn script(raw: u64) -> ScriptId {
    ScriptId::new(raw)
}

fn set(raw: u64) -> StatementSetId {
    StatementSetId::new(raw)
}

fn member(script_raw: u64, position: u32, set_raw: u64) -> Member {
    Member::new(script(script_raw), position, set(set_raw))
}

fn registry() -> StatementSetRegistry<InMemoryStore> {
    StatementSetRegistry::new(InMemoryStore::new())
}

#[test]
fn test_fresh_members_keep_their_sets() {
    let registry = registry();
    let ids = registry
        .assign(&[member(1, 0, 1), member(1, 10, 2)])
        .unwrap();
    assert_eq!(ids, vec![set(1), set(2)]);
    assert_eq!(registry.store().all_members().len(), 2);
    assert!(registry.assign(&[]).unwrap().is_empty());
}

#[test]
fn test_collision_merges_into_smaller_id() {
    let registry = registry();
    registry
        .assign(&[member(1, 0, 5), member(2, 0, 5), member(2, 7, 3)])
        .unwrap();
    // (1, 0) already belongs to 5; the newcomer 3 wins because it is smaller
    let ids = registry.assign(&[member(1, 0, 3)]).unwrap();
    assert_eq!(ids, vec![set(3)]);
    let statement_set = registry.statement_set(set(3)).unwrap();
    assert_eq!(
        statement_set.members,
        vec![member(2, 0, 3), member(2, 7, 3), member(1, 0, 3)]
    );
    assert_eq!(
        registry.statement_set(set(5)),
        Err(RegistryError::UnknownSet(set(5)))
    );
}

#[test]
fn test_merges_are_transitive_within_a_batch() {
    let registry = registry();
    registry.assign(&[member(1, 0, 2), member(1, 4, 5)]).unwrap();
    let ids = registry
        .assign(&[member(1, 0, 7), member(1, 4, 7), member(1, 9, 7)])
        .unwrap();
    assert_eq!(ids, vec![set(2), set(2), set(2)]);
    let positions: Vec<_> = registry
        .statement_set(set(2))
        .unwrap()
        .members
        .iter()
        .map(|m| m.position)
        .collect();
    assert_eq!(positions, vec![0, 4, 9]);
}

#[test]
fn test_store_error_rolls_back_whole_batch() {
    let registry = registry();
    registry.assign(&[member(1, 0, 4)]).unwrap();
    registry.store().fail_after_writes(2);
    // two inserts succeed, the relabel of 4 into 1 fails
    let result = registry.assign(&[member(1, 0, 1), member(1, 3, 1)]);
    assert!(matches!(result, Err(RegistryError::Store(_))));
    assert_eq!(registry.store().all_members(), vec![member(1, 0, 4)]);
}

#[test]
fn test_failures_follow_merges() {
    let registry = registry();
    registry.assign(&[member(1, 0, 6)]).unwrap();
    registry
        .record_failures(&[MappingFailure::new(script(2), set(6))])
        .unwrap();
    registry.assign(&[member(1, 0, 4)]).unwrap();
    assert_eq!(
        registry.store().all_failures(),
        vec![MappingFailure::new(script(2), set(4))]
    );
    assert!(registry.has_failed(set(4), script(2)).unwrap());
    assert!(!registry.has_failed(set(4), script(3)).unwrap());
}

#[test]
fn test_commit_applies_everything_at_once() {
    let registry = registry();
    registry.assign(&[member(1, 0, 1), member(1, 5, 2)]).unwrap();
    let update = BatchUpdate {
        members: vec![member(2, 3, 1)],
        failures: vec![MappingFailure::new(script(2), set(2))],
        mark_mapped: Some(script(2)),
    };
    assert!(!update.is_empty());
    assert_eq!(registry.commit(&update).unwrap(), vec![set(1)]);
    assert!(registry.is_mapped(script(2)).unwrap());
    assert!(!registry.is_mapped(script(1)).unwrap());
    assert_eq!(registry.members_of_script(script(2)).unwrap(), vec![member(2, 3, 1)]);

    registry.store().fail_after_writes(0);
    let update = BatchUpdate {
        mark_mapped: Some(script(3)),
        ..BatchUpdate::default()
    };
    assert!(registry.commit(&update).is_err());
    assert!(!registry.is_mapped(script(3)).unwrap());
}

#[test]
fn test_abandoned_after_three_trailing_failures() {
    let registry = registry();
    registry.assign(&[member(1, 0, 1)]).unwrap();
    let failures: Vec<_> = (2..=4)
        .map(|raw| MappingFailure::new(script(raw), set(1)))
        .collect();
    registry.record_failures(&failures).unwrap();
    assert!(!registry.is_abandoned(set(1), script(4)).unwrap());
    assert!(registry.is_abandoned(set(1), script(5)).unwrap());

    // mapping again revives the set
    registry.assign(&[member(5, 0, 1)]).unwrap();
    assert!(!registry.is_abandoned(set(1), script(6)).unwrap());
}

#[test]
fn test_threshold_is_configurable() {
    let registry = StatementSetRegistry::with_config(
        InMemoryStore::new(),
        RegistryConfig {
            failure_threshold: 1,
        },
    );
    registry.assign(&[member(1, 0, 1)]).unwrap();
    registry
        .record_failures(&[MappingFailure::new(script(2), set(1))])
        .unwrap();
    assert!(registry.is_abandoned(set(1), script(3)).unwrap());

    let registry = StatementSetRegistry::with_config(InMemoryStore::new(), RegistryConfig::persistent());
    assert_eq!(registry.config().failure_threshold, usize::MAX);
    assert!(!registry.is_abandoned(set(1), script(3)).unwrap());
}

#[test]
fn test_anchor_creates_once() {
    let registry = registry();
    let first = registry.anchor(script(1), 12).unwrap();
    assert_eq!(registry.anchor(script(1), 12).unwrap(), first);
    let other = registry.anchor(script(1), 20).unwrap();
    assert_ne!(first, other);
}

#[test]
fn test_concurrent_anchors_agree() {
    let registry = registry();
    let ids: Vec<StatementSetId> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.anchor(script(1), 0).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(ids.iter().all(|&id| id == ids[0]));
    assert_eq!(registry.store().all_members().len(), 1);
}

#[test]
fn test_concurrent_batches_on_shared_scripts() {
    let registry = registry();
    std::thread::scope(|scope| {
        for thread in 0..4u64 {
            let registry = &registry;
            scope.spawn(move || {
                for position in 0..16 {
                    registry
                        .assign(&[member(1, position, 100 + thread), member(2, position, 200 + thread)])
                        .unwrap();
                }
            });
        }
    });
    // every thread collided with every other, so each script collapsed
    // into the smallest id used for it
    let members = registry.store().all_members();
    assert_eq!(members.len(), 32);
    for m in members {
        let expected = if m.script == script(1) { 100 } else { 200 };
        assert_eq!(m.set, set(expected));
    }
}

/// Preload `existing`, then assign `batch`; returns the ids and the table.
fn run(existing: &[Member], batch: &[Member]) -> (Vec<StatementSetId>, Vec<Member>) {
    let store = InMemoryStore::new();
    store
        .transaction(|txn: &mut dyn MembershipTxn| {
            for &member in existing {
                txn.insert_or_get(member)?;
            }
            Ok(())
        })
        .unwrap();
    let registry = StatementSetRegistry::new(store);
    let ids = registry.assign(batch).unwrap();
    (ids, registry.store().all_members())
}

fn members() -> impl Strategy<Value = Vec<Member>> {
    prop::collection::vec((1u64..3, 0u32..4, 1u64..8), 0..10)
        .prop_map(|rows| rows.into_iter().map(|(s, p, id)| member(s, p, id)).collect())
}

proptest! {
    #[test]
    fn prop_merge_is_order_independent(existing in members(), batch in members()) {
        let (ids, table) = run(&existing, &batch);
        let reversed: Vec<Member> = batch.iter().rev().copied().collect();
        let (reversed_ids, reversed_table) = run(&existing, &reversed);
        prop_assert_eq!(table, reversed_table);
        let mut reversed_ids = reversed_ids;
        reversed_ids.reverse();
        prop_assert_eq!(ids, reversed_ids);
    }
}
