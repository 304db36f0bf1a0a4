//! Persistence of memberships, failures and mapped flags.
//!
//! `MembershipStore` is the seam to the real database. Writes only happen
//! inside `transaction`, which either applies every write of the closure or
//! none of them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::error::StoreError;
use crate::ids::{MappingFailure, Member, ScriptId, StatementSetId};

/// Read access and transactions over the membership tables.
pub trait MembershipStore: Send + Sync {
    /// A fresh, never handed out statement set id.
    fn next_set_id(&self) -> Result<StatementSetId, StoreError>;

    /// The set owning `position` in `script`, if any.
    fn set_at(&self, script: ScriptId, position: u32) -> Result<Option<StatementSetId>, StoreError>;

    fn members_of_script(&self, script: ScriptId) -> Result<Vec<Member>, StoreError>;

    fn members_of_set(&self, set: StatementSetId) -> Result<Vec<Member>, StoreError>;

    fn failures_of_set(&self, set: StatementSetId) -> Result<Vec<MappingFailure>, StoreError>;

    /// Whether `script` has been mapped against its predecessors.
    fn is_mapped(&self, script: ScriptId) -> Result<bool, StoreError>;

    /// Run `f` atomically. When `f` or a write fails, nothing is applied.
    fn transaction<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut dyn MembershipTxn) -> Result<R, StoreError>;
}

/// Writes available inside a transaction.
pub trait MembershipTxn {
    /// Insert `member` unless its (script, position) is taken. Returns the
    /// set now owning the position.
    fn insert_or_get(&mut self, member: Member) -> Result<StatementSetId, StoreError>;

    /// Move every row of the `merged` sets to `canonical`. Returns the
    /// number of member rows moved.
    fn relabel(
        &mut self,
        merged: &[StatementSetId],
        canonical: StatementSetId,
    ) -> Result<usize, StoreError>;

    /// Record a failure; recording the same one twice keeps one row.
    fn insert_failure(&mut self, failure: MappingFailure) -> Result<(), StoreError>;

    fn mark_mapped(&mut self, script: ScriptId) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
struct Tables {
    members: BTreeMap<(ScriptId, u32), StatementSetId>,
    failures: BTreeSet<(StatementSetId, ScriptId)>,
    mapped: FxHashSet<ScriptId>,
}

/// In-process store used by tests and the command line.
///
/// Transactions work on a copy of the tables and swap it in on success.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    next_set_id: AtomicU64,
    write_budget: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore {
            tables: Mutex::new(Tables::default()),
            next_set_id: AtomicU64::new(1),
            write_budget: AtomicUsize::new(usize::MAX),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    /// Make every write after the next `writes` fail, to exercise rollback.
    /// `usize::MAX` lifts the limit.
    pub fn fail_after_writes(&self, writes: usize) {
        self.write_budget.store(writes, Ordering::SeqCst);
    }

    /// Every member row, ordered by (script, position).
    pub fn all_members(&self) -> Vec<Member> {
        self.tables
            .lock()
            .members
            .iter()
            .map(|(&(script, position), &set)| Member::new(script, position, set))
            .collect()
    }

    /// Every failure row, ordered by (set, script).
    pub fn all_failures(&self) -> Vec<MappingFailure> {
        self.tables
            .lock()
            .failures
            .iter()
            .map(|&(set, script)| MappingFailure::new(script, set))
            .collect()
    }
}

impl MembershipStore for InMemoryStore {
    fn next_set_id(&self) -> Result<StatementSetId, StoreError> {
        Ok(StatementSetId::new(self.next_set_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn set_at(&self, script: ScriptId, position: u32) -> Result<Option<StatementSetId>, StoreError> {
        Ok(self.tables.lock().members.get(&(script, position)).copied())
    }

    fn members_of_script(&self, script: ScriptId) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .tables
            .lock()
            .members
            .range((script, 0)..=(script, u32::MAX))
            .map(|(&(script, position), &set)| Member::new(script, position, set))
            .collect())
    }

    fn members_of_set(&self, set: StatementSetId) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .tables
            .lock()
            .members
            .iter()
            .filter(|&(_, &owner)| owner == set)
            .map(|(&(script, position), &set)| Member::new(script, position, set))
            .collect())
    }

    fn failures_of_set(&self, set: StatementSetId) -> Result<Vec<MappingFailure>, StoreError> {
        Ok(self
            .tables
            .lock()
            .failures
            .range((set, ScriptId::new(0))..=(set, ScriptId::new(u64::MAX)))
            .map(|&(set, script)| MappingFailure::new(script, set))
            .collect())
    }

    fn is_mapped(&self, script: ScriptId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().mapped.contains(&script))
    }

    fn transaction<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut dyn MembershipTxn) -> Result<R, StoreError>,
    {
        let mut tables = self.tables.lock();
        let mut txn = InMemoryTxn {
            draft: tables.clone(),
            write_budget: &self.write_budget,
        };
        let result = f(&mut txn)?;
        *tables = txn.draft;
        Ok(result)
    }
}

struct InMemoryTxn<'a> {
    draft: Tables,
    write_budget: &'a AtomicUsize,
}

impl InMemoryTxn<'_> {
    fn spend_write(&self) -> Result<(), StoreError> {
        let previous = self
            .write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                (left != usize::MAX).then(|| left.saturating_sub(1))
            });
        match previous {
            Ok(0) => Err(StoreError::new("injected write failure")),
            _ => Ok(()),
        }
    }
}

impl MembershipTxn for InMemoryTxn<'_> {
    fn insert_or_get(&mut self, member: Member) -> Result<StatementSetId, StoreError> {
        self.spend_write()?;
        Ok(*self
            .draft
            .members
            .entry((member.script, member.position))
            .or_insert(member.set))
    }

    fn relabel(
        &mut self,
        merged: &[StatementSetId],
        canonical: StatementSetId,
    ) -> Result<usize, StoreError> {
        self.spend_write()?;
        let mut moved = 0;
        for set in self.draft.members.values_mut() {
            if merged.contains(set) {
                *set = canonical;
                moved += 1;
            }
        }
        let failures: Vec<_> = self
            .draft
            .failures
            .iter()
            .copied()
            .filter(|(set, _)| merged.contains(set))
            .collect();
        for (set, script) in failures {
            self.draft.failures.remove(&(set, script));
            self.draft.failures.insert((canonical, script));
        }
        Ok(moved)
    }

    fn insert_failure(&mut self, failure: MappingFailure) -> Result<(), StoreError> {
        self.spend_write()?;
        self.draft.failures.insert((failure.set, failure.script));
        Ok(())
    }

    fn mark_mapped(&mut self, script: ScriptId) -> Result<(), StoreError> {
        self.spend_write()?;
        self.draft.mapped.insert(script);
        Ok(())
    }
}
