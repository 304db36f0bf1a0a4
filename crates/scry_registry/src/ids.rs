//! Identifiers and rows of the membership store.

use std::fmt;

/// One deployed version of a script.
///
/// Ids grow with upload order, so comparing two ids of the same URL
/// compares their versions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ScriptId(u64);

impl ScriptId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        ScriptId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptId({})", self.0)
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of "the same statement" across versions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StatementSetId(u64);

impl StatementSetId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        StatementSetId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for StatementSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatementSetId({})", self.0)
    }
}

impl fmt::Display for StatementSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A symbol position of one script version belonging to a statement set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Member {
    pub script: ScriptId,
    /// Byte offset of the statement start in the generated text.
    pub position: u32,
    pub set: StatementSetId,
}

impl Member {
    pub const fn new(script: ScriptId, position: u32, set: StatementSetId) -> Self {
        Member {
            script,
            position,
            set,
        }
    }
}

/// A recorded failure to find `set` in `script`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingFailure {
    pub script: ScriptId,
    pub set: StatementSetId,
}

impl MappingFailure {
    pub const fn new(script: ScriptId, set: StatementSetId) -> Self {
        MappingFailure { script, set }
    }
}

/// A statement set with all of its members, newest version first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementSet {
    pub id: StatementSetId,
    pub members: Vec<Member>,
}

impl StatementSet {
    /// Build a set, ordering `members` newest version first.
    pub fn new(id: StatementSetId, mut members: Vec<Member>) -> Self {
        members.sort_by(|a, b| b.script.cmp(&a.script).then(a.position.cmp(&b.position)));
        StatementSet { id, members }
    }

    /// The member in `script`, if the set has one there.
    pub fn member_in(&self, script: ScriptId) -> Option<&Member> {
        self.members.iter().find(|member| member.script == script)
    }

    /// Distinct versions holding a member, newest first.
    pub fn scripts(&self) -> impl Iterator<Item = ScriptId> + '_ {
        let mut previous = None;
        self.members.iter().filter_map(move |member| {
            (previous != Some(member.script)).then(|| {
                previous = Some(member.script);
                member.script
            })
        })
    }
}
