//! Mapping stores backing the identity resolver.
//!
//! Two layers: an immutable [`StaticTable`] seeded at startup and consulted
//! first, and a mutable [`MappingStore`] holding mappings discovered by
//! dynamic resolution. The store is a trait so an evicting or external
//! backing can replace the in-memory map without touching the resolver's
//! contract.

use std::collections::HashMap;

use dashmap::DashMap;

use super::{ExternalId, InternalId};

/// Mutable store for resolved id mappings, owned by the resolver.
///
/// Implementations must tolerate concurrent use; racing writers for the same
/// key are last-writer-wins.
pub trait MappingStore: Send + Sync {
    fn get(&self, external_id: ExternalId) -> Option<InternalId>;
    fn insert(&self, external_id: ExternalId, internal_id: InternalId);
}

/// Process-lifetime in-memory store.
///
/// Entries are never evicted; the map lives as long as the process. Distinct
/// ids shard across [`DashMap`] buckets so concurrent resolutions do not
/// contend.
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    entries: DashMap<ExternalId, InternalId>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MappingStore for InMemoryMappingStore {
    fn get(&self, external_id: ExternalId) -> Option<InternalId> {
        self.entries.get(&external_id).map(|e| e.value().clone())
    }

    fn insert(&self, external_id: ExternalId, internal_id: InternalId) {
        self.entries.insert(external_id, internal_id);
    }
}

/// Immutable external-to-internal id table, authoritative over both the
/// cache and dynamic search. Seeded once at startup, never invalidated at
/// runtime.
#[derive(Debug, Clone, Default)]
pub struct StaticTable {
    entries: HashMap<ExternalId, InternalId>,
}

impl StaticTable {
    pub fn new(entries: HashMap<ExternalId, InternalId>) -> Self {
        Self { entries }
    }

    pub fn get(&self, external_id: ExternalId) -> Option<&str> {
        self.entries.get(&external_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
