//! Bottom-up phase: pair containers whose matched descendants overlap.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::recovery::recover;
use super::similarity::{
    dice, id_closeness, position_closeness, sort_candidates, Candidate, CommonDescendants,
};
use super::{Correspondence, MatcherConfig};
use crate::node_id::NodeId;
use crate::tree::Tree;

pub(super) fn match_containers(
    src: &Tree,
    dst: &Tree,
    config: &MatcherConfig,
    correspondence: &mut Correspondence,
) {
    let post_order = src.post_order();
    let mut common = CommonDescendants::default();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();

    for round in 0..config.max_bottom_up_rounds {
        common.clear();
        let mut candidates: Vec<Candidate> = Vec::new();

        for &a in &post_order {
            if a == src.root() || src.is_leaf(a) || correspondence.is_src_matched(a) {
                continue;
            }
            visited.clear();
            let mut proposed: SmallVec<[NodeId; 8]> = SmallVec::new();
            for t in src.descendants(a) {
                let Some(partner) = correspondence.dst(t) else {
                    continue;
                };
                for s in dst.ancestors(partner) {
                    // ancestors above a visited node were walked already
                    if s == dst.root() || !visited.insert(s) {
                        break;
                    }
                    if !correspondence.is_dst_matched(s) && dst.kind(s) == src.kind(a) {
                        proposed.push(s);
                    }
                }
            }

            for b in proposed {
                let shared = common.count(src, dst, correspondence, a, b);
                let overlap = dice(shared, src, a, dst, b);
                if overlap < config.min_dice {
                    continue;
                }
                candidates.push(Candidate {
                    score: config.overlap_weight * overlap
                        + config.position_weight * position_closeness(src, a, dst, b)
                        + config.id_weight * id_closeness(src, a, dst, b),
                    src: a,
                    dst: b,
                });
            }
        }

        if candidates.is_empty() {
            break;
        }
        sort_candidates(&mut candidates);

        let mut accepted = 0usize;
        for candidate in candidates {
            if correspondence.is_src_matched(candidate.src)
                || correspondence.is_dst_matched(candidate.dst)
            {
                continue;
            }
            correspondence.link(candidate.src, candidate.dst);
            accepted += 1;
            recover(src, dst, config, correspondence, candidate.src, candidate.dst);
        }
        tracing::trace!(round, accepted, "bottom-up round");
        if accepted == 0 {
            break;
        }
    }
}
