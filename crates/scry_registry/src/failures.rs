//! Abandonment of statement sets that keep failing to map.

use crate::ids::{MappingFailure, Member, ScriptId};

/// Failures recorded for a set after its newest member, counting only
/// versions before `target`.
///
/// A member resets the count: a set that mapped again has been seen alive
/// since those failures.
pub(crate) fn trailing_failures(
    members: &[Member],
    failures: &[MappingFailure],
    target: ScriptId,
) -> usize {
    let newest_member = members
        .iter()
        .map(|member| member.script)
        .filter(|&script| script < target)
        .max();
    failures
        .iter()
        .filter(|failure| failure.script < target)
        .filter(|failure| newest_member.map_or(true, |newest| failure.script > newest))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::StatementSetId;

    const SET: StatementSetId = StatementSetId::new(1);

    fn member(script: u64) -> Member {
        Member::new(ScriptId::new(script), 0, SET)
    }

    fn failure(script: u64) -> MappingFailure {
        MappingFailure::new(ScriptId::new(script), SET)
    }

    #[test]
    fn test_counts_failures_after_newest_member() {
        let members = [member(1), member(4)];
        let failures = [failure(2), failure(3), failure(5), failure(6)];
        assert_eq!(trailing_failures(&members, &failures, ScriptId::new(10)), 2);
    }

    #[test]
    fn test_ignores_target_and_later_versions() {
        let members = [member(1)];
        let failures = [failure(2), failure(3), failure(4)];
        assert_eq!(trailing_failures(&members, &failures, ScriptId::new(4)), 2);
        assert_eq!(trailing_failures(&members, &failures, ScriptId::new(5)), 3);
    }

    #[test]
    fn test_newer_member_resets() {
        let members = [member(1), member(9)];
        let failures = [failure(2), failure(3), failure(4)];
        assert_eq!(trailing_failures(&members, &failures, ScriptId::new(10)), 0);
        // before the reset the failures still count
        assert_eq!(trailing_failures(&members, &failures, ScriptId::new(9)), 3);
    }

    #[test]
    fn test_no_members() {
        assert_eq!(trailing_failures(&[], &[failure(2)], ScriptId::new(3)), 1);
    }
}
