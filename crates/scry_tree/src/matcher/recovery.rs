//! Child alignment under a freshly paired container.

use smallvec::SmallVec;

use super::similarity::subtree_unmatched;
use super::{Correspondence, MatcherConfig};
use crate::node_id::NodeId;
use crate::stack::ensure_sufficient_stack;
use crate::tree::Tree;

/// Align the unmatched children of the pair `(a, b)`.
///
/// Isomorphic children are paired first, whole subtrees at a time; the
/// remaining children are then paired by kind and recovered in turn.
pub(super) fn recover(
    src: &Tree,
    dst: &Tree,
    config: &MatcherConfig,
    correspondence: &mut Correspondence,
    a: NodeId,
    b: NodeId,
) {
    if src.size(a).max(dst.size(b)) > config.max_recovery_size {
        return;
    }
    ensure_sufficient_stack(|| {
        let (src_children, dst_children) = unmatched_children(src, dst, correspondence, a, b);
        for (x, y) in lcs(&src_children, &dst_children, |x, y| src.isomorphic(x, dst, y)) {
            if subtree_unmatched(src, x, |id| correspondence.is_src_matched(id))
                && subtree_unmatched(dst, y, |id| correspondence.is_dst_matched(id))
            {
                correspondence.link_subtrees(src, x, y);
            }
        }

        let (src_children, dst_children) = unmatched_children(src, dst, correspondence, a, b);
        for (x, y) in lcs(&src_children, &dst_children, |x, y| src.kind(x) == dst.kind(y)) {
            correspondence.link(x, y);
            recover(src, dst, config, correspondence, x, y);
        }
    });
}

type Children = SmallVec<[NodeId; 8]>;

fn unmatched_children(
    src: &Tree,
    dst: &Tree,
    correspondence: &Correspondence,
    a: NodeId,
    b: NodeId,
) -> (Children, Children) {
    let src_children = src
        .children(a)
        .iter()
        .copied()
        .filter(|&x| !correspondence.is_src_matched(x))
        .collect();
    let dst_children = dst
        .children(b)
        .iter()
        .copied()
        .filter(|&y| !correspondence.is_dst_matched(y))
        .collect();
    (src_children, dst_children)
}

/// Longest common subsequence of `xs` and `ys` under `eq`, as pairs.
fn lcs(
    xs: &[NodeId],
    ys: &[NodeId],
    eq: impl Fn(NodeId, NodeId) -> bool,
) -> Vec<(NodeId, NodeId)> {
    let (n, m) = (xs.len(), ys.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }
    let width = m + 1;
    // table[i * width + j]: LCS length of xs[i..] and ys[j..]
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if eq(xs[i], ys[j]) {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if eq(xs[i], ys[j]) {
            pairs.push((xs[i], ys[j]));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn test_lcs_keeps_order() {
        let xs = ids(&[1, 2, 3, 4]);
        let ys = ids(&[2, 4, 3]);
        let pairs = lcs(&xs, &ys, |x, y| x == y);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
    }

    #[test]
    fn test_lcs_empty_side() {
        assert!(lcs(&[], &ids(&[1]), |_, _| true).is_empty());
    }
}
