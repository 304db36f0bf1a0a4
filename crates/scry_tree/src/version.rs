//! Position lookup between two matched versions of a script.

use rustc_hash::FxHashMap;

use crate::matcher::{match_trees, Correspondence, MatcherConfig};
use crate::tree::Tree;

/// Maps symbol positions (byte offsets of node starts) of an old version to
/// the new version and back.
///
/// Several nodes can start at the same offset (`a.b()` opens a statement,
/// a call, a member expression and an identifier at once). The first of
/// them in pre-order that has a partner decides where the offset goes. The
/// root spans the whole script and is left out, so offset 0 follows the
/// first statement.
#[derive(Clone, Debug, Default)]
pub struct VersionMapper {
    forward: FxHashMap<u32, u32>,
    backward: FxHashMap<u32, u32>,
}

impl VersionMapper {
    pub fn new(correspondence: &Correspondence, old: &Tree, new: &Tree) -> Self {
        let mut forward = FxHashMap::default();
        for id in old.pre_order().skip(1) {
            if let Some(partner) = correspondence.dst(id) {
                forward
                    .entry(old.span(id).start)
                    .or_insert(new.span(partner).start);
            }
        }
        let mut backward = FxHashMap::default();
        for id in new.pre_order().skip(1) {
            if let Some(partner) = correspondence.src(id) {
                backward
                    .entry(new.span(id).start)
                    .or_insert(old.span(partner).start);
            }
        }
        VersionMapper { forward, backward }
    }

    /// Match `old` against `new` and index the result.
    pub fn diff(old: &Tree, new: &Tree, config: &MatcherConfig) -> Self {
        VersionMapper::new(&match_trees(old, new, config), old, new)
    }

    /// Where the node starting at `old_position` went, if anywhere.
    pub fn map_position(&self, old_position: u32) -> Option<u32> {
        self.forward.get(&old_position).copied()
    }

    /// Where the node starting at `new_position` came from, if anywhere.
    pub fn map_position_back(&self, new_position: u32) -> Option<u32> {
        self.backward.get(&new_position).copied()
    }

    /// Number of old positions with a destination.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

#[cfg(test)]
mod tests;
