//! Statement set registry.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, StoreError};
use crate::failures::trailing_failures;
use crate::ids::{MappingFailure, Member, ScriptId, StatementSet, StatementSetId};
use crate::merge::SetUnion;
use crate::store::MembershipStore;

/// Writes of one orchestration step, applied in a single transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchUpdate {
    pub members: Vec<Member>,
    pub failures: Vec<MappingFailure>,
    /// Version to flag as mapped against its predecessors.
    pub mark_mapped: Option<ScriptId>,
}

impl BatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.failures.is_empty() && self.mark_mapped.is_none()
    }
}

/// Assigns positions to statement sets and tracks mapping failures.
///
/// Batches touching the same script are serialised through a per-script
/// lock table; locks are always taken in ascending script order.
pub struct StatementSetRegistry<S> {
    store: S,
    config: RegistryConfig,
    locks: DashMap<ScriptId, Arc<Mutex<()>>>,
}

impl<S: MembershipStore> StatementSetRegistry<S> {
    pub fn new(store: S) -> Self {
        StatementSetRegistry::with_config(store, RegistryConfig::default())
    }

    pub fn with_config(store: S, config: RegistryConfig) -> Self {
        StatementSetRegistry {
            store,
            config,
            locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Add `batch` to the registry.
    ///
    /// A position that already belongs to another set keeps its row, and the
    /// two sets are merged; merges are transitive across the batch and every
    /// merged class takes its smallest id. Returns the canonical set of each
    /// member, in batch order. On a store error nothing is applied.
    #[tracing::instrument(level = "debug", skip_all, fields(members = batch.len()))]
    pub fn assign(&self, batch: &[Member]) -> Result<Vec<StatementSetId>, RegistryError> {
        self.apply(batch, &[], None)
    }

    /// Append failure rows atomically.
    pub fn record_failures(&self, failures: &[MappingFailure]) -> Result<(), RegistryError> {
        self.apply(&[], failures, None).map(|_| ())
    }

    /// Apply memberships, failures and the mapped flag in one transaction.
    /// Returns the canonical set of each member.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(members = update.members.len(), failures = update.failures.len())
    )]
    pub fn commit(&self, update: &BatchUpdate) -> Result<Vec<StatementSetId>, RegistryError> {
        self.apply(&update.members, &update.failures, update.mark_mapped)
    }

    fn apply(
        &self,
        members: &[Member],
        failures: &[MappingFailure],
        mark_mapped: Option<ScriptId>,
    ) -> Result<Vec<StatementSetId>, RegistryError> {
        if members.is_empty() && failures.is_empty() && mark_mapped.is_none() {
            return Ok(Vec::new());
        }
        let scripts = members
            .iter()
            .map(|member| member.script)
            .chain(failures.iter().map(|failure| failure.script))
            .chain(mark_mapped);

        let canonical = self.with_scripts_locked(scripts, || {
            self.store.transaction(|txn| {
                let mut union = SetUnion::default();
                let mut owners = Vec::with_capacity(members.len());
                for &member in members {
                    let owner = txn.insert_or_get(member)?;
                    if owner != member.set {
                        union.union(owner, member.set);
                    }
                    owners.push(owner);
                }
                for (canonical, merged) in union.classes() {
                    let moved = txn.relabel(&merged, canonical)?;
                    tracing::debug!(%canonical, merged = merged.len(), moved, "merged statement sets");
                }
                for failure in failures {
                    let set = union.canonical(failure.set);
                    txn.insert_failure(MappingFailure::new(failure.script, set))?;
                }
                if let Some(script) = mark_mapped {
                    txn.mark_mapped(script)?;
                }
                Ok(owners
                    .into_iter()
                    .map(|owner| union.canonical(owner))
                    .collect())
            })
        })?;
        Ok(canonical)
    }

    /// Whether `set` has failed to map often enough, before `target`, to be
    /// skipped from now on.
    ///
    /// Counts the failures recorded after the set's newest member; all
    /// attempted versions count, in version order.
    pub fn is_abandoned(&self, set: StatementSetId, target: ScriptId) -> Result<bool, RegistryError> {
        let members = self.store.members_of_set(set)?;
        let failures = self.store.failures_of_set(set)?;
        let count = trailing_failures(&members, &failures, target);
        let abandoned = count >= self.config.failure_threshold;
        if abandoned {
            tracing::trace!(%set, %target, failures = count, "statement set abandoned");
        }
        Ok(abandoned)
    }

    /// Whether a failure of `set` is already recorded for `script`.
    pub fn has_failed(&self, set: StatementSetId, script: ScriptId) -> Result<bool, RegistryError> {
        Ok(self
            .store
            .failures_of_set(set)?
            .iter()
            .any(|failure| failure.script == script))
    }

    /// The set owning `position` in `script`, created on first use.
    pub fn anchor(&self, script: ScriptId, position: u32) -> Result<StatementSetId, RegistryError> {
        if let Some(set) = self.store.set_at(script, position)? {
            return Ok(set);
        }
        let fresh = self.store.next_set_id()?;
        let owner = self.with_scripts_locked([script], || {
            self.store
                .transaction(|txn| txn.insert_or_get(Member::new(script, position, fresh)))
        })?;
        Ok(owner)
    }

    /// All members of `set`, newest version first.
    pub fn statement_set(&self, set: StatementSetId) -> Result<StatementSet, RegistryError> {
        let members = self.store.members_of_set(set)?;
        if members.is_empty() {
            return Err(RegistryError::UnknownSet(set));
        }
        Ok(StatementSet::new(set, members))
    }

    pub fn members_of_script(&self, script: ScriptId) -> Result<Vec<Member>, RegistryError> {
        Ok(self.store.members_of_script(script)?)
    }

    pub fn is_mapped(&self, script: ScriptId) -> Result<bool, RegistryError> {
        Ok(self.store.is_mapped(script)?)
    }

    fn with_scripts_locked<R>(
        &self,
        scripts: impl IntoIterator<Item = ScriptId>,
        f: impl FnOnce() -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut scripts: Vec<ScriptId> = scripts.into_iter().collect();
        scripts.sort_unstable();
        scripts.dedup();
        let locks: Vec<Arc<Mutex<()>>> = scripts
            .iter()
            .map(|&script| Arc::clone(self.locks.entry(script).or_default().value()))
            .collect();
        let _guards: Vec<MutexGuard<'_, ()>> = locks.iter().map(|lock| lock.lock()).collect();
        f()
    }
}

#[cfg(test)]
mod tests;
