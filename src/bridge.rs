//! Lookups across the two index maps that connect entity mentions and coref
//! mentions.
//!
//! Upstream populates the two directions independently, so they are not
//! inverses of each other and either may be missing entirely. Every lookup
//! here folds "no map", "no key", and "key mapped to null" into `None`.

use coreflink_core::{CorefMentionId, CorefToEntityMap, Document, EntityToCorefMap};
use std::collections::HashMap;
use std::hash::Hash;

/// Look up `key` in a nullable map whose values may themselves be null.
///
/// ```rust
/// use coreflink::bridge::lookup;
/// use std::collections::HashMap;
///
/// let mut map: HashMap<usize, Option<u64>> = HashMap::new();
/// map.insert(0, Some(100));
/// map.insert(1, None);
///
/// assert_eq!(lookup(Some(&map), &0), Some(100));
/// assert_eq!(lookup(Some(&map), &1), None);
/// assert_eq!(lookup(Some(&map), &2), None);
/// assert_eq!(lookup::<usize, u64>(None, &0), None);
/// ```
#[must_use]
pub fn lookup<K, V>(map: Option<&HashMap<K, Option<V>>>, key: &K) -> Option<V>
where
    K: Eq + Hash,
    V: Copy,
{
    map?.get(key).copied().flatten()
}

/// Read-only view over a document's two index maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionIndexBridge<'a> {
    entity_to_coref: Option<&'a EntityToCorefMap>,
    coref_to_entity: Option<&'a CorefToEntityMap>,
}

impl<'a> MentionIndexBridge<'a> {
    /// Build a bridge from explicit maps.
    #[must_use]
    pub fn new(
        entity_to_coref: Option<&'a EntityToCorefMap>,
        coref_to_entity: Option<&'a CorefToEntityMap>,
    ) -> Self {
        Self {
            entity_to_coref,
            coref_to_entity,
        }
    }

    /// Build a bridge over the maps a document carries.
    #[must_use]
    pub fn for_document(document: &'a Document) -> Self {
        Self::new(
            document.entity_to_coref.as_ref(),
            document.coref_to_entity.as_ref(),
        )
    }

    /// Coref mention ID for an entity mention index.
    #[must_use]
    pub fn coref_id(&self, entity_index: usize) -> Option<CorefMentionId> {
        lookup(self.entity_to_coref, &entity_index)
    }

    /// Entity mention index for a coref mention ID.
    #[must_use]
    pub fn entity_index(&self, coref_id: CorefMentionId) -> Option<usize> {
        lookup(self.coref_to_entity, &coref_id)
    }

    /// Check if either direction has any usable entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let forward = self
            .entity_to_coref
            .map_or(true, |m| m.values().all(Option::is_none));
        let backward = self
            .coref_to_entity
            .map_or(true, |m| m.values().all(Option::is_none));
        forward && backward
    }
}
