//! Bounded caches for parsed trees and diffs.
//!
//! Every entry is computed at most once while it stays cached, even when
//! several threads ask for it at the same time: the first caller computes,
//! the others wait on the entry's slot and share the result. Entries are
//! evicted in insertion order once `capacity` is exceeded.

use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use scry_registry::ScriptId;
use scry_sourcemap::SourceMap;
use scry_tree::{Tree, VersionMapper};

use crate::repository::ScriptContent;

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

struct MemoInner<K, V> {
    slots: FxHashMap<K, Slot<V>>,
    order: VecDeque<K>,
}

/// Keyed compute-once cache with insertion-order eviction.
pub(crate) struct Memo<K, V> {
    name: &'static str,
    capacity: usize,
    inner: Mutex<MemoInner<K, V>>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug, V> Memo<K, V> {
    pub(crate) fn new(name: &'static str, capacity: usize) -> Self {
        Memo {
            name,
            capacity,
            inner: Mutex::new(MemoInner {
                slots: FxHashMap::default(),
                order: VecDeque::new(),
            }),
        }
    }

    /// The cached value for `key`, computing it with `compute` if needed.
    ///
    /// A failed computation leaves the slot empty for the next caller.
    pub(crate) fn get_or_try_insert<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = {
            let mut inner = self.inner.lock();
            if let Some(slot) = inner.slots.get(&key) {
                Arc::clone(slot)
            } else {
                let slot: Slot<V> = Arc::default();
                inner.slots.insert(key, Arc::clone(&slot));
                inner.order.push_back(key);
                while inner.order.len() > self.capacity {
                    if let Some(evicted) = inner.order.pop_front() {
                        inner.slots.remove(&evicted);
                    }
                }
                slot
            }
        };

        let mut cached = slot.lock();
        if let Some(value) = cached.as_ref() {
            tracing::debug!(cache = self.name, ?key, "cache hit");
            return Ok(Arc::clone(value));
        }
        tracing::debug!(cache = self.name, ?key, "cache miss");
        let computed = Arc::new(compute()?);
        *cached = Some(Arc::clone(&computed));
        Ok(computed)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }
}

/// Diff identity: an unordered pair of versions and the labeling used.
///
/// A diff between two versions answers both directions, so `(a, b)` and
/// `(b, a)` share one entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiffKey {
    pub low: ScriptId,
    pub high: ScriptId,
    /// Identifiers were labeled through source maps.
    pub source_mapped: bool,
}

impl DiffKey {
    pub fn new(a: ScriptId, b: ScriptId, source_mapped: bool) -> Self {
        DiffKey {
            low: a.min(b),
            high: a.max(b),
            source_mapped,
        }
    }
}

/// A loaded version with its source map, if one was uploaded and fits.
pub(crate) struct LoadedScript {
    pub content: ScriptContent,
    pub source_map: Option<SourceMap>,
}

/// A cached diff seen from one side.
#[derive(Clone)]
pub struct DirectedMapper {
    mapper: Arc<VersionMapper>,
    forward: bool,
}

impl DirectedMapper {
    pub(crate) fn new(mapper: Arc<VersionMapper>, forward: bool) -> Self {
        DirectedMapper { mapper, forward }
    }

    /// Position in the new version of the node starting at `old_position`.
    pub fn map_position(&self, old_position: u32) -> Option<u32> {
        if self.forward {
            self.mapper.map_position(old_position)
        } else {
            self.mapper.map_position_back(old_position)
        }
    }
}

/// Scripts, trees and diffs shared by the calls of one mapper.
pub(crate) struct DiffCache {
    pub scripts: Memo<ScriptId, LoadedScript>,
    pub trees: Memo<(ScriptId, bool), Tree>,
    pub diffs: Memo<DiffKey, VersionMapper>,
}

impl DiffCache {
    pub(crate) fn new(capacity: usize) -> Self {
        DiffCache {
            // a diff needs both of its scripts and trees
            scripts: Memo::new("scripts", capacity.saturating_mul(2)),
            trees: Memo::new("trees", capacity.saturating_mul(2)),
            diffs: Memo::new("diffs", capacity),
        }
    }
}

#[cfg(test)]
mod tests;
