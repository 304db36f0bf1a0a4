//! Access to stored script versions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use scry_registry::ScriptId;
use thiserror::Error;

/// Identity of a stored script version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptRecord {
    pub id: ScriptId,
    /// Versions of the same script share a URL.
    pub url: String,
}

/// Text of a script version and the source map uploaded with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptContent {
    pub text: String,
    pub source_map_json: Option<String>,
}

impl ScriptContent {
    pub fn new(text: impl Into<String>) -> Self {
        ScriptContent {
            text: text.into(),
            source_map_json: None,
        }
    }

    #[must_use]
    pub fn with_source_map(mut self, json: impl Into<String>) -> Self {
        self.source_map_json = Some(json.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("unknown script {0}")]
    UnknownScript(ScriptId),

    #[error("script repository: {0}")]
    Backend(String),
}

pub trait ScriptRepository: Send + Sync {
    fn script(&self, id: ScriptId) -> Result<ScriptRecord, RepositoryError>;

    fn load_script_content(&self, id: ScriptId) -> Result<ScriptContent, RepositoryError>;

    /// Up to `limit` versions of `url` older than `before`, newest first.
    fn load_recent_versions(
        &self,
        url: &str,
        before: ScriptId,
        limit: usize,
    ) -> Result<Vec<ScriptId>, RepositoryError>;
}

/// Script versions kept in memory, numbered in upload order.
#[derive(Debug)]
pub struct InMemoryRepository {
    scripts: RwLock<BTreeMap<ScriptId, (ScriptRecord, ScriptContent)>>,
    next_id: AtomicU64,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        InMemoryRepository {
            scripts: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        InMemoryRepository::default()
    }

    /// Store a new version of `url`.
    pub fn add(&self, url: &str, content: ScriptContent) -> ScriptId {
        let id = ScriptId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = ScriptRecord {
            id,
            url: url.to_owned(),
        };
        self.scripts.write().insert(id, (record, content));
        id
    }

    pub fn len(&self) -> usize {
        self.scripts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.read().is_empty()
    }
}

impl ScriptRepository for InMemoryRepository {
    fn script(&self, id: ScriptId) -> Result<ScriptRecord, RepositoryError> {
        self.scripts
            .read()
            .get(&id)
            .map(|(record, _)| record.clone())
            .ok_or(RepositoryError::UnknownScript(id))
    }

    fn load_script_content(&self, id: ScriptId) -> Result<ScriptContent, RepositoryError> {
        self.scripts
            .read()
            .get(&id)
            .map(|(_, content)| content.clone())
            .ok_or(RepositoryError::UnknownScript(id))
    }

    fn load_recent_versions(
        &self,
        url: &str,
        before: ScriptId,
        limit: usize,
    ) -> Result<Vec<ScriptId>, RepositoryError> {
        Ok(self
            .scripts
            .read()
            .range(..before)
            .rev()
            .filter(|(_, (record, _))| record.url == url)
            .map(|(&id, _)| id)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_versions_newest_first() {
        let repository = InMemoryRepository::new();
        let a1 = repository.add("a.js", ScriptContent::new("1"));
        let _b1 = repository.add("b.js", ScriptContent::new("x"));
        let a2 = repository.add("a.js", ScriptContent::new("2"));
        let a3 = repository.add("a.js", ScriptContent::new("3"));
        let a4 = repository.add("a.js", ScriptContent::new("4"));

        let recent = repository.load_recent_versions("a.js", a4, 2).unwrap_or_default();
        assert_eq!(recent, vec![a3, a2]);
        let recent = repository.load_recent_versions("a.js", a3, 10).unwrap_or_default();
        assert_eq!(recent, vec![a2, a1]);
        assert_eq!(repository.len(), 5);
    }

    #[test]
    fn test_unknown_script() {
        let repository = InMemoryRepository::new();
        let missing = ScriptId::new(7);
        assert_eq!(
            repository.script(missing),
            Err(RepositoryError::UnknownScript(missing))
        );
        let id = repository.add("a.js", ScriptContent::new("f();").with_source_map("{}"));
        let content = repository.load_script_content(id);
        assert_eq!(content.map(|c| c.source_map_json), Ok(Some("{}".to_owned())));
    }
}
