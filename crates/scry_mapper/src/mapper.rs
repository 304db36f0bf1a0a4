//! Orchestration: carrying statement sets across script versions.

use std::collections::BTreeSet;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use scry_registry::{
    BatchUpdate, MappingFailure, Member, MembershipStore, ScriptId, StatementSet,
    StatementSetId, StatementSetRegistry,
};
use scry_sourcemap::SourceMap;
use scry_tree::{Labeler, Tree, VersionMapper};

use crate::config::MapperConfig;
use crate::cover::covering_versions;
use crate::diff_cache::{DiffCache, DiffKey, DirectedMapper, LoadedScript};
use crate::error::MapperError;
use crate::parser::ScriptParser;
use crate::repository::ScriptRepository;

/// Outcome of `map_new_version`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewVersionReport {
    pub script: Option<ScriptId>,
    /// The version was mapped before; nothing was done.
    pub already_mapped: bool,
    /// Preceding versions that were diffed against the new one.
    pub compared_versions: Vec<ScriptId>,
    /// Memberships created in the new version, with canonical set ids.
    pub mapped: Vec<Member>,
    pub failures: Vec<MappingFailure>,
}

/// Where a target statement set lands in a version.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetMapping {
    Success {
        position: u32,
        set: StatementSetId,
        /// The membership was created by this call.
        new: bool,
    },
    Failure {
        set: StatementSetId,
    },
}

impl TargetMapping {
    pub fn position(&self) -> Option<u32> {
        match *self {
            TargetMapping::Success { position, .. } => Some(position),
            TargetMapping::Failure { .. } => None,
        }
    }
}

/// Maps statement sets of earlier versions of a script onto a new one.
///
/// Scripts, parsed trees and diffs are cached for the lifetime of the
/// mapper; keep one around to share work between calls.
pub struct ScriptVersionMapper<R, P, S> {
    repository: R,
    parser: P,
    registry: StatementSetRegistry<S>,
    config: MapperConfig,
    cache: DiffCache,
}

impl<R, P, S> ScriptVersionMapper<R, P, S>
where
    R: ScriptRepository,
    P: ScriptParser,
    S: MembershipStore,
{
    pub fn new(repository: R, parser: P, store: S, config: MapperConfig) -> Self {
        let registry = StatementSetRegistry::with_config(store, config.registry.clone());
        let cache = DiffCache::new(config.diff_cache_capacity);
        ScriptVersionMapper {
            repository,
            parser,
            registry,
            config,
            cache,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn registry(&self) -> &StatementSetRegistry<S> {
        &self.registry
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Carry the statement sets of the preceding versions of `new_script`
    /// into it.
    ///
    /// Versions are tried newest first. A set is taken from the first
    /// version where its position maps; sets that were attempted and never
    /// mapped get a failure record. Mapping the same version twice is a
    /// no-op.
    #[tracing::instrument(level = "debug", skip_all, fields(script = %new_script))]
    pub fn map_new_version(&self, new_script: ScriptId) -> Result<NewVersionReport, MapperError> {
        if self.registry.is_mapped(new_script)? {
            tracing::debug!("version already mapped");
            return Ok(NewVersionReport {
                script: Some(new_script),
                already_mapped: true,
                ..NewVersionReport::default()
            });
        }

        let record = self.repository.script(new_script)?;
        let previous =
            self.repository
                .load_recent_versions(&record.url, new_script, self.config.lookback)?;
        tracing::debug!(previous = previous.len(), "found preceding versions");

        let mut seen: FxHashSet<StatementSetId> = FxHashSet::default();
        let mut unmapped: BTreeSet<StatementSetId> = BTreeSet::new();
        let mut abandoned: FxHashMap<StatementSetId, bool> = FxHashMap::default();
        let mut memberships = Vec::new();
        let mut compared_versions = Vec::new();

        for old_script in previous {
            let mut candidates = Vec::new();
            for member in self.registry.members_of_script(old_script)? {
                if seen.contains(&member.set) {
                    continue;
                }
                let skip = match abandoned.get(&member.set) {
                    Some(&skip) => skip,
                    None => {
                        let skip = self.registry.is_abandoned(member.set, new_script)?;
                        abandoned.insert(member.set, skip);
                        skip
                    }
                };
                if !skip {
                    candidates.push(member);
                }
            }
            if candidates.is_empty() {
                continue;
            }

            let mapper = self.diff(old_script, new_script)?;
            compared_versions.push(old_script);
            for member in candidates {
                if seen.contains(&member.set) {
                    continue;
                }
                if let Some(position) = mapper.map_position(member.position) {
                    seen.insert(member.set);
                    unmapped.remove(&member.set);
                    memberships.push(Member::new(new_script, position, member.set));
                } else {
                    tracing::trace!(?member, "failed to map membership");
                    unmapped.insert(member.set);
                }
            }
        }

        let failures: Vec<MappingFailure> = unmapped
            .into_iter()
            .map(|set| MappingFailure::new(new_script, set))
            .collect();
        let update = BatchUpdate {
            members: memberships,
            failures,
            mark_mapped: Some(new_script),
        };
        let canonical = self.registry.commit(&update)?;
        let mapped = update
            .members
            .iter()
            .zip(canonical)
            .map(|(member, set)| Member::new(member.script, member.position, set))
            .collect::<Vec<_>>();
        tracing::debug!(
            mapped = mapped.len(),
            failures = update.failures.len(),
            "mapped new version"
        );

        Ok(NewVersionReport {
            script: Some(new_script),
            already_mapped: false,
            compared_versions,
            mapped,
            failures: update.failures,
        })
    }

    /// Find every target in `target_script`, one result per target in
    /// order.
    ///
    /// Targets with a member in `target_script` resolve directly. Targets
    /// that already failed there, or are abandoned, fail without a diff. For
    /// the rest, a small covering set of versions is diffed against the target
    /// in parallel, and each target tries its members newest first. New
    /// memberships and failures are recorded before returning.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(script = %target_script, targets = targets.len())
    )]
    pub fn map_existing_targets(
        &self,
        target_script: ScriptId,
        targets: &[StatementSet],
    ) -> Result<Vec<TargetMapping>, MapperError> {
        let mut results: Vec<Option<TargetMapping>> = targets
            .iter()
            .map(|target| {
                target
                    .member_in(target_script)
                    .map(|member| TargetMapping::Success {
                        position: member.position,
                        set: target.id,
                        new: false,
                    })
            })
            .collect();

        let mut unresolved = Vec::new();
        for (index, target) in targets.iter().enumerate() {
            if results[index].is_some() {
                continue;
            }
            if self.registry.has_failed(target.id, target_script)?
                || self.registry.is_abandoned(target.id, target_script)?
            {
                results[index] = Some(TargetMapping::Failure { set: target.id });
            } else {
                unresolved.push(index);
            }
        }

        if !unresolved.is_empty() {
            let pending: Vec<&StatementSet> = unresolved.iter().map(|&i| &targets[i]).collect();
            let picks = covering_versions(&pending, target_script);
            tracing::debug!(versions = picks.len(), "picked versions to diff");

            let mappers: FxHashMap<ScriptId, DirectedMapper> = picks
                .par_iter()
                .map(|&old_script| -> Result<_, MapperError> {
                    Ok((old_script, self.diff(old_script, target_script)?))
                })
                .collect::<Result<_, _>>()?;

            let mut members = Vec::new();
            let mut failures = Vec::new();
            for &index in &unresolved {
                let target = &targets[index];
                let position = target.members.iter().find_map(|member| {
                    mappers
                        .get(&member.script)?
                        .map_position(member.position)
                });
                if let Some(position) = position {
                    members.push((index, Member::new(target_script, position, target.id)));
                } else {
                    tracing::debug!(set = %target.id, "target could not be mapped");
                    failures.push(MappingFailure::new(target_script, target.id));
                    results[index] = Some(TargetMapping::Failure { set: target.id });
                }
            }

            let update = BatchUpdate {
                members: members.iter().map(|&(_, member)| member).collect(),
                failures,
                mark_mapped: None,
            };
            let canonical = self.registry.commit(&update)?;
            for (&(index, member), set) in members.iter().zip(canonical) {
                results[index] = Some(TargetMapping::Success {
                    position: member.position,
                    set,
                    new: true,
                });
            }
        }

        Ok(results
            .into_iter()
            .zip(targets)
            .map(|(result, target)| result.unwrap_or(TargetMapping::Failure { set: target.id }))
            .collect())
    }

    /// The diff from `old_script` to `new_script`, through the cache.
    ///
    /// Identifiers are labeled through source maps only when both versions
    /// carry a usable one.
    pub fn diff(&self, old_script: ScriptId, new_script: ScriptId) -> Result<DirectedMapper, MapperError> {
        let old = self.script(old_script)?;
        let new = self.script(new_script)?;
        let source_mapped = old.source_map.is_some() && new.source_map.is_some();
        let key = DiffKey::new(old_script, new_script, source_mapped);
        let mapper = self.cache.diffs.get_or_try_insert(key, || -> Result<_, MapperError> {
            let low = self.tree(key.low, source_mapped)?;
            let high = self.tree(key.high, source_mapped)?;
            Ok(VersionMapper::diff(&low, &high, &self.config.matcher))
        })?;
        Ok(DirectedMapper::new(mapper, old_script == key.low))
    }

    fn script(&self, id: ScriptId) -> Result<Arc<LoadedScript>, MapperError> {
        self.cache.scripts.get_or_try_insert(id, || -> Result<_, MapperError> {
            let content = self.repository.load_script_content(id)?;
            let source_map = match content.source_map_json.as_deref() {
                Some(json) => usable_source_map(id, &content.text, json)?,
                None => None,
            };
            Ok(LoadedScript {
                content,
                source_map,
            })
        })
    }

    fn tree(&self, id: ScriptId, source_mapped: bool) -> Result<Arc<Tree>, MapperError> {
        self.cache.trees.get_or_try_insert((id, source_mapped), || -> Result<_, MapperError> {
            let script = self.script(id)?;
            let syntax = self
                .parser
                .parse(&script.content.text)
                .map_err(|source| MapperError::Parse { script: id, source })?;
            let tree = match script.source_map.as_ref().filter(|_| source_mapped) {
                Some(map) => {
                    let labeler = Labeler::with_source_map(&script.content.text, map)
                        .map_err(|source| MapperError::SourceMap { script: id, source })?;
                    Tree::build(&syntax, &labeler)
                }
                None => Tree::build(&syntax, &Labeler::plain()),
            };
            Ok(tree)
        })
    }
}

/// Parse a version's source map. A map that does not fit the text (uploaded
/// for another build) is ignored rather than trusted.
fn usable_source_map(
    script: ScriptId,
    text: &str,
    json: &str,
) -> Result<Option<SourceMap>, MapperError> {
    let map = SourceMap::parse(json).map_err(|source| MapperError::SourceMap { script, source })?;
    let mappings = map
        .decode_mappings()
        .map_err(|source| MapperError::SourceMap { script, source })?;
    if let Err(error) = mappings.validate_against(text) {
        tracing::debug!(%script, %error, "ignoring source map that does not fit the script");
        return Ok(None);
    }
    Ok(Some(map))
}
