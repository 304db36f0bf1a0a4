//! Choosing which versions to diff for a batch of targets.

use std::collections::BTreeSet;

use scry_registry::{ScriptId, StatementSet};

/// A small set of versions such that every target with a member outside
/// `exclude` has a member in one of them.
///
/// Minimum set cover is NP-hard; this is the greedy approximation: keep
/// picking the version covering the most uncovered targets, preferring the
/// newest version on ties.
pub(crate) fn covering_versions(targets: &[&StatementSet], exclude: ScriptId) -> Vec<ScriptId> {
    let mut options: BTreeSet<ScriptId> = targets
        .iter()
        .flat_map(|target| target.members.iter().map(|member| member.script))
        .filter(|&script| script != exclude)
        .collect();
    let mut uncovered: Vec<&StatementSet> = targets.to_vec();
    let mut picked = Vec::new();

    while !uncovered.is_empty() {
        let mut best: Option<(ScriptId, usize)> = None;
        for &option in options.iter().rev() {
            let covered = uncovered
                .iter()
                .filter(|target| target.member_in(option).is_some())
                .count();
            if covered > best.map_or(0, |(_, count)| count) {
                best = Some((option, covered));
            }
        }
        let Some((version, _)) = best else {
            break;
        };
        picked.push(version);
        options.remove(&version);
        uncovered.retain(|target| target.member_in(version).is_none());
    }
    picked
}
