//! Structural tree matching.
//!
//! Two phases, in the style of GumTree:
//!
//! 1. **Top-down**: subtrees with equal structural hashes are paired,
//!    tallest first. Hashes unique on both sides pair directly; ambiguous
//!    groups are ranked by how similar the surroundings are.
//! 2. **Bottom-up**: internal nodes whose matched descendants overlap enough
//!    are paired, best score first. Every pair accepted here gets its
//!    still-unmatched children aligned by longest common subsequence.
//!
//! The result is a heuristic; no attempt is made at a minimal edit script.

mod bottom_up;
mod recovery;
mod similarity;
mod top_down;

use crate::node_id::NodeId;
use crate::tree::Tree;

/// Tuning knobs for `match_trees`.
#[derive(Clone, Debug, PartialEq)]
pub struct MatcherConfig {
    /// Smallest subtree height considered by the top-down phase. 1 lets
    /// unique leaves (distinctive literals, names) anchor the match.
    pub min_height: u32,
    /// Minimum Dice overlap of matched descendants for a bottom-up pair.
    pub min_dice: f64,
    /// Weight of the descendant overlap (Dice for bottom-up pairs, Jaccard
    /// of the parents for ambiguous top-down pairs) in the score.
    pub overlap_weight: f64,
    /// Weight of the sibling position closeness in the score.
    pub position_weight: f64,
    /// Weight of the document order closeness in the score.
    pub id_weight: f64,
    /// Upper bound on bottom-up rounds.
    pub max_bottom_up_rounds: usize,
    /// Subtrees larger than this are not aligned child by child.
    pub max_recovery_size: u32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            min_height: 1,
            min_dice: 0.5,
            overlap_weight: 100.0,
            position_weight: 10.0,
            id_weight: 1.0,
            max_bottom_up_rounds: 32,
            max_recovery_size: 1000,
        }
    }
}

impl MatcherConfig {
    /// Only pair nodes with a strong descendant overlap.
    pub fn strict() -> Self {
        MatcherConfig {
            min_dice: 0.75,
            ..MatcherConfig::default()
        }
    }

    /// Skip leaf anchors and child alignment; for very large scripts.
    pub fn fast() -> Self {
        MatcherConfig {
            min_height: 2,
            max_recovery_size: 0,
            ..MatcherConfig::default()
        }
    }
}

/// Node pairs between a source and a destination tree.
///
/// Every node has at most one partner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Correspondence {
    src_to_dst: Vec<Option<NodeId>>,
    dst_to_src: Vec<Option<NodeId>>,
}

impl Correspondence {
    pub fn new(src_len: usize, dst_len: usize) -> Self {
        Correspondence {
            src_to_dst: vec![None; src_len],
            dst_to_src: vec![None; dst_len],
        }
    }

    /// Pair `src` with `dst`. Both must be unpaired.
    pub(crate) fn link(&mut self, src: NodeId, dst: NodeId) {
        debug_assert!(self.src_to_dst[src.index()].is_none());
        debug_assert!(self.dst_to_src[dst.index()].is_none());
        self.src_to_dst[src.index()] = Some(dst);
        self.dst_to_src[dst.index()] = Some(src);
    }

    /// Pair two isomorphic subtrees node by node.
    pub(crate) fn link_subtrees(&mut self, src_tree: &Tree, src: NodeId, dst: NodeId) {
        for offset in 0..src_tree.size(src) {
            self.link(
                NodeId::new(src.raw() + offset),
                NodeId::new(dst.raw() + offset),
            );
        }
    }

    #[inline]
    pub fn dst(&self, src: NodeId) -> Option<NodeId> {
        self.src_to_dst[src.index()]
    }

    #[inline]
    pub fn src(&self, dst: NodeId) -> Option<NodeId> {
        self.dst_to_src[dst.index()]
    }

    #[inline]
    pub fn is_src_matched(&self, src: NodeId) -> bool {
        self.src_to_dst[src.index()].is_some()
    }

    #[inline]
    pub fn is_dst_matched(&self, dst: NodeId) -> bool {
        self.dst_to_src[dst.index()].is_some()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.src_to_dst.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All pairs, by source id.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.src_to_dst
            .iter()
            .enumerate()
            .filter_map(|(i, dst)| dst.map(|dst| (NodeId::new(i as u32), dst)))
    }
}

/// Match `src` against `dst`.
#[tracing::instrument(level = "debug", skip_all, fields(src = src.len(), dst = dst.len()))]
pub fn match_trees(src: &Tree, dst: &Tree, config: &MatcherConfig) -> Correspondence {
    let mut correspondence = Correspondence::new(src.len(), dst.len());
    if src.is_empty() || dst.is_empty() {
        return correspondence;
    }

    top_down::match_subtrees(src, dst, config, &mut correspondence);
    let after_top_down = correspondence.len();

    bottom_up::match_containers(src, dst, config, &mut correspondence);

    let (src_root, dst_root) = (src.root(), dst.root());
    if !correspondence.is_src_matched(src_root)
        && !correspondence.is_dst_matched(dst_root)
        && src.kind(src_root) == dst.kind(dst_root)
    {
        correspondence.link(src_root, dst_root);
    }

    tracing::debug!(
        top_down = after_top_down,
        total = correspondence.len(),
        "matched trees"
    );
    correspondence
}
