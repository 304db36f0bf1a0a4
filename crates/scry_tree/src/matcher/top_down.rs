//! Greedy top-down phase: pair isomorphic subtrees, tallest first.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::similarity::{
    id_closeness, jaccard, position_closeness, sort_candidates, subtree_unmatched, Candidate,
    CommonDescendants,
};
use super::{Correspondence, MatcherConfig};
use crate::node_id::NodeId;
use crate::tree::Tree;

/// Nodes waiting to be compared, bucketed by height.
struct HeightQueue {
    by_height: BTreeMap<u32, Vec<NodeId>>,
    min_height: u32,
}

impl HeightQueue {
    fn new(tree: &Tree, min_height: u32) -> Self {
        let mut queue = HeightQueue {
            by_height: BTreeMap::new(),
            min_height,
        };
        queue.push(tree, tree.root());
        queue
    }

    fn peek_height(&self) -> Option<u32> {
        self.by_height.keys().next_back().copied()
    }

    /// All nodes of the greatest height.
    fn pop(&mut self) -> Vec<NodeId> {
        self.by_height
            .pop_last()
            .map(|(_, nodes)| nodes)
            .unwrap_or_default()
    }

    fn push(&mut self, tree: &Tree, id: NodeId) {
        let height = tree.height(id);
        if height >= self.min_height {
            self.by_height.entry(height).or_default().push(id);
        }
    }

    fn open(&mut self, tree: &Tree, id: NodeId) {
        for &child in tree.children(id) {
            self.push(tree, child);
        }
    }
}

type HashGroup = (SmallVec<[NodeId; 2]>, SmallVec<[NodeId; 2]>);

pub(super) fn match_subtrees(
    src: &Tree,
    dst: &Tree,
    config: &MatcherConfig,
    correspondence: &mut Correspondence,
) {
    let min_height = config.min_height.max(1);
    let mut src_queue = HeightQueue::new(src, min_height);
    let mut dst_queue = HeightQueue::new(dst, min_height);
    let mut ambiguous: Vec<(NodeId, NodeId)> = Vec::new();

    while let (Some(src_height), Some(dst_height)) =
        (src_queue.peek_height(), dst_queue.peek_height())
    {
        if src_height > dst_height {
            for id in src_queue.pop() {
                src_queue.open(src, id);
            }
            continue;
        }
        if dst_height > src_height {
            for id in dst_queue.pop() {
                dst_queue.open(dst, id);
            }
            continue;
        }

        let src_nodes = src_queue.pop();
        let dst_nodes = dst_queue.pop();

        let mut groups: FxHashMap<u64, HashGroup> = FxHashMap::default();
        for &a in &src_nodes {
            groups.entry(src.hash(a)).or_default().0.push(a);
        }
        for &b in &dst_nodes {
            groups.entry(dst.hash(b)).or_default().1.push(b);
        }

        let mut src_paired: FxHashSet<NodeId> = FxHashSet::default();
        let mut dst_paired: FxHashSet<NodeId> = FxHashSet::default();
        let mut unique: Vec<(NodeId, NodeId)> = Vec::new();
        for &a in &src_nodes {
            let Some((group_src, group_dst)) = groups.get(&src.hash(a)) else {
                continue;
            };
            let partners: SmallVec<[NodeId; 2]> = group_dst
                .iter()
                .copied()
                .filter(|&b| src.isomorphic(a, dst, b))
                .collect();
            if partners.is_empty() {
                continue;
            }
            src_paired.insert(a);
            dst_paired.extend(partners.iter().copied());
            if group_src.len() == 1 && group_dst.len() == 1 {
                unique.push((a, partners[0]));
            } else {
                ambiguous.extend(partners.iter().map(|&b| (a, b)));
            }
        }

        for (a, b) in unique {
            correspondence.link_subtrees(src, a, b);
        }
        for &a in src_nodes.iter().filter(|a| !src_paired.contains(a)) {
            src_queue.open(src, a);
        }
        for &b in dst_nodes.iter().filter(|b| !dst_paired.contains(b)) {
            dst_queue.open(dst, b);
        }
    }

    if !ambiguous.is_empty() {
        resolve_ambiguous(src, dst, config, correspondence, ambiguous);
    }
}

/// Pair isomorphic subtrees that had several candidates, preferring the
/// pairs whose parents already share the most matched descendants.
fn resolve_ambiguous(
    src: &Tree,
    dst: &Tree,
    config: &MatcherConfig,
    correspondence: &mut Correspondence,
    ambiguous: Vec<(NodeId, NodeId)>,
) {
    let mut common = CommonDescendants::default();
    let mut candidates: Vec<Candidate> = ambiguous
        .into_iter()
        .map(|(a, b)| {
            let parents = match (src.parent(a), dst.parent(b)) {
                (Some(pa), Some(pb)) => {
                    let shared = common.count(src, dst, correspondence, pa, pb);
                    jaccard(shared, src, pa, dst, pb)
                }
                _ => 0.0,
            };
            Candidate {
                score: config.overlap_weight * parents
                    + config.position_weight * position_closeness(src, a, dst, b)
                    + config.id_weight * id_closeness(src, a, dst, b),
                src: a,
                dst: b,
            }
        })
        .collect();
    sort_candidates(&mut candidates);

    let mut accepted = 0usize;
    for candidate in candidates {
        if subtree_unmatched(src, candidate.src, |id| correspondence.is_src_matched(id))
            && subtree_unmatched(dst, candidate.dst, |id| correspondence.is_dst_matched(id))
        {
            correspondence.link_subtrees(src, candidate.src, candidate.dst);
            accepted += 1;
        }
    }
    tracing::trace!(accepted, "resolved ambiguous subtrees");
}
