use super::model::ClassMetadata;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-run cache of parsed class metadata keyed by internal class name.
///
/// Lookups that failed are not recorded, so a later request re-probes the
/// search path.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<String, Arc<ClassMetadata>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, internal_name: &str) -> Option<Arc<ClassMetadata>> {
        self.entries.get(internal_name).cloned()
    }

    /// Stores `metadata` under `internal_name` unless an entry already
    /// exists; returns the cached value.
    pub fn insert(&mut self, internal_name: &str, metadata: ClassMetadata) -> Arc<ClassMetadata> {
        self.entries
            .entry(internal_name.to_string())
            .or_insert_with(|| Arc::new(metadata))
            .clone()
    }

    /// Returns the cached entry for `internal_name`, or computes and stores it.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        internal_name: &str,
        load: impl FnOnce() -> Result<ClassMetadata, E>,
    ) -> Result<Arc<ClassMetadata>, E> {
        if let Some(hit) = self.get(internal_name) {
            return Ok(hit);
        }
        let metadata = load()?;
        Ok(self.insert(internal_name, metadata))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
