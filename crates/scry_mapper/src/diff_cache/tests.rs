#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;

fn script(raw: u64) -> ScriptId {
    ScriptId::new(raw)
}

#[test]
fn test_computes_once_across_threads() {
    let memo: Memo<u32, String> = Memo::new("test", 4);
    let calls = AtomicUsize::new(0);
    let values: Vec<Arc<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    memo.get_or_try_insert(1, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(5));
                        Ok::<_, ()>("one".to_owned())
                    })
                    .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(values.iter().all(|value| Arc::ptr_eq(value, &values[0])));
}

#[test]
fn test_evicts_oldest_entry() {
    let memo: Memo<u32, u32> = Memo::new("test", 2);
    for key in 0..3 {
        memo.get_or_try_insert(key, || Ok::<_, ()>(key * 10)).unwrap();
    }
    assert_eq!(memo.len(), 2);

    // 0 was evicted and is computed again; 2 is still cached
    let calls = AtomicUsize::new(0);
    let compute = |value: u32| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, ()>(value)
    };
    assert_eq!(*memo.get_or_try_insert(2, || compute(99)).unwrap(), 20);
    assert_eq!(*memo.get_or_try_insert(0, || compute(7)).unwrap(), 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failure_is_not_cached() {
    let memo: Memo<u32, u32> = Memo::new("test", 2);
    assert_eq!(memo.get_or_try_insert(5, || Err("boom")), Err("boom"));
    assert_eq!(*memo.get_or_try_insert(5, || Ok::<_, &str>(3)).unwrap(), 3);
}

#[test]
fn test_diff_key_ignores_direction() {
    assert_eq!(
        DiffKey::new(script(9), script(2), false),
        DiffKey::new(script(2), script(9), false)
    );
    assert_ne!(
        DiffKey::new(script(2), script(9), true),
        DiffKey::new(script(2), script(9), false)
    );
    let key = DiffKey::new(script(9), script(2), true);
    assert_eq!((key.low, key.high), (script(2), script(9)));
}

#[test]
fn test_directed_mapper_reads_both_ways() {
    let tree = |source: &str| {
        scry_tree::Tree::build(
            &scry_tree::testing::parse(source).unwrap(),
            &scry_tree::Labeler::plain(),
        )
    };
    let old = "a(1);\nb(2);";
    let new = "b(2);";
    let mapper = Arc::new(VersionMapper::diff(
        &tree(old),
        &tree(new),
        &scry_tree::MatcherConfig::default(),
    ));
    let forward = DirectedMapper::new(Arc::clone(&mapper), true);
    let backward = DirectedMapper::new(mapper, false);
    assert_eq!(forward.map_position(6), Some(0));
    assert_eq!(backward.map_position(0), Some(6));
    assert_eq!(forward.map_position(0), None);
}
