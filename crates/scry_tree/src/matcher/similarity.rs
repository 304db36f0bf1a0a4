//! Scores shared by both matching phases.

use rustc_hash::FxHashMap;

use super::Correspondence;
use crate::node_id::NodeId;
use crate::tree::Tree;

/// Memoized count of matched descendant pairs between two subtrees.
///
/// Entries go stale as soon as the correspondence grows; callers clear the
/// memo whenever they add pairs between lookups.
#[derive(Default)]
pub(super) struct CommonDescendants {
    memo: FxHashMap<(NodeId, NodeId), u32>,
}

impl CommonDescendants {
    pub(super) fn clear(&mut self) {
        self.memo.clear();
    }

    /// Descendants of `a` whose partner is a descendant of `b`.
    pub(super) fn count(
        &mut self,
        src: &Tree,
        dst: &Tree,
        correspondence: &Correspondence,
        a: NodeId,
        b: NodeId,
    ) -> u32 {
        *self.memo.entry((a, b)).or_insert_with(|| {
            src.descendants(a)
                .filter(|&t| {
                    correspondence
                        .dst(t)
                        .is_some_and(|partner| dst.is_descendant(b, partner))
                })
                .count() as u32
        })
    }
}

/// `2c / (|desc a| + |desc b|)`.
pub(super) fn dice(common: u32, src: &Tree, a: NodeId, dst: &Tree, b: NodeId) -> f64 {
    let total = src.descendant_count(a) + dst.descendant_count(b);
    if total == 0 {
        return 0.0;
    }
    2.0 * f64::from(common) / f64::from(total)
}

/// `c / |desc a ∪ desc b|`.
pub(super) fn jaccard(common: u32, src: &Tree, a: NodeId, dst: &Tree, b: NodeId) -> f64 {
    let union = (src.descendant_count(a) + dst.descendant_count(b)).saturating_sub(common);
    if union == 0 {
        return 0.0;
    }
    f64::from(common) / f64::from(union)
}

fn relative_position(tree: &Tree, id: NodeId) -> f64 {
    let siblings = tree.sibling_count(id);
    if siblings <= 1 {
        return 0.0;
    }
    tree.position_in_parent(id) as f64 / (siblings - 1) as f64
}

/// 1 when both nodes sit at the same relative place among their siblings.
pub(super) fn position_closeness(src: &Tree, a: NodeId, dst: &Tree, b: NodeId) -> f64 {
    1.0 - (relative_position(src, a) - relative_position(dst, b)).abs()
}

/// 1 when both nodes have the same pre-order index.
pub(super) fn id_closeness(src: &Tree, a: NodeId, dst: &Tree, b: NodeId) -> f64 {
    let span = src.len().max(dst.len()).max(1) as f64;
    1.0 - (f64::from(a.raw()) - f64::from(b.raw())).abs() / span
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Candidate {
    pub score: f64,
    pub src: NodeId,
    pub dst: NodeId,
}

/// Best score first; ties broken by source then destination id so the
/// outcome never depends on collection order.
pub(super) fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| x.src.cmp(&y.src))
            .then_with(|| x.dst.cmp(&y.dst))
    });
}

/// Whether no node of the subtree at `id` has a partner yet.
pub(super) fn subtree_unmatched(
    tree: &Tree,
    id: NodeId,
    is_matched: impl Fn(NodeId) -> bool,
) -> bool {
    !is_matched(id) && tree.descendants(id).all(|d| !is_matched(d))
}
