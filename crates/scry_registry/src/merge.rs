//! Transitive merging of colliding statement sets.

use rustc_hash::FxHashMap;

use crate::ids::StatementSetId;

/// Union-find over statement set ids whose representative is always the
/// smallest id of its class, so the outcome does not depend on the order
/// collisions are reported in.
#[derive(Debug, Default)]
pub(crate) struct SetUnion {
    parent: FxHashMap<StatementSetId, StatementSetId>,
}

impl SetUnion {
    /// Smallest id equal to `id`.
    pub(crate) fn canonical(&mut self, id: StatementSetId) -> StatementSetId {
        let mut root = id;
        while let Some(&parent) = self.parent.get(&root) {
            root = parent;
        }
        // path compression
        let mut node = id;
        while let Some(&parent) = self.parent.get(&node) {
            if parent == root {
                break;
            }
            self.parent.insert(node, root);
            node = parent;
        }
        root
    }

    pub(crate) fn union(&mut self, a: StatementSetId, b: StatementSetId) {
        let (a, b) = (self.canonical(a), self.canonical(b));
        if a == b {
            return;
        }
        let (keep, merged) = if a < b { (a, b) } else { (b, a) };
        self.parent.insert(merged, keep);
    }

    /// Every class with more than one id, as (canonical, merged ids), sorted.
    pub(crate) fn classes(&mut self) -> Vec<(StatementSetId, Vec<StatementSetId>)> {
        let ids: Vec<StatementSetId> = self.parent.keys().copied().collect();
        let mut classes: FxHashMap<StatementSetId, Vec<StatementSetId>> = FxHashMap::default();
        for id in ids {
            let canonical = self.canonical(id);
            classes.entry(canonical).or_default().push(id);
        }
        let mut classes: Vec<_> = classes
            .into_iter()
            .map(|(canonical, mut merged)| {
                merged.sort_unstable();
                (canonical, merged)
            })
            .collect();
        classes.sort_unstable();
        classes
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn id(raw: u64) -> StatementSetId {
        StatementSetId::new(raw)
    }

    #[test]
    fn test_transitive_classes() {
        let mut union = SetUnion::default();
        union.union(id(5), id(3));
        union.union(id(9), id(5));
        union.union(id(7), id(8));
        assert_eq!(union.canonical(id(9)), id(3));
        assert_eq!(union.canonical(id(1)), id(1));
        assert_eq!(
            union.classes(),
            vec![(id(3), vec![id(5), id(9)]), (id(7), vec![id(8)])]
        );
    }

    proptest! {
        #[test]
        fn prop_classes_ignore_pair_order(
            pairs in prop::collection::vec((0u64..12, 0u64..12), 0..20),
        ) {
            let mut forward = SetUnion::default();
            for &(a, b) in &pairs {
                forward.union(id(a), id(b));
            }
            let mut backward = SetUnion::default();
            for &(a, b) in pairs.iter().rev() {
                backward.union(id(b), id(a));
            }
            prop_assert_eq!(forward.classes(), backward.classes());
            for &(a, b) in &pairs {
                let canonical = forward.canonical(id(a));
                prop_assert_eq!(canonical, forward.canonical(id(b)));
                prop_assert!(canonical <= id(a).min(id(b)));
            }
        }
    }
}
