use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ember_dns_domain::record::CachedRecord;
use ember_dns_domain::{ARecord, NsRecord};
use std::collections::HashMap;
use tracing::debug;

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<R> {
    Hit(Vec<R>),
    Miss,
}

/// A cache store mapping a domain name to an ordered sequence of records of
/// one kind.
///
/// There is no capacity bound and no eviction sweep: expired entries are
/// filtered out on the next lookup of the same key and the surviving list is
/// written back, amortizing cleanup across accesses.
pub struct RecordStore<R> {
    entries: DashMap<String, Vec<R>>,
}

impl<R: CachedRecord + Clone> RecordStore<R> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn from_entries(entries: HashMap<String, Vec<R>>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Add `record` to the sequence at `key`, creating it if absent.
    /// No de-duplication: appending an equal record produces two entries.
    pub fn append(&self, key: &str, record: R) {
        self.entries.entry(key.to_string()).or_default().push(record);
    }

    /// Return the valid records for `key`, atomically replacing the stored
    /// sequence with the filtered result. A miss is an absent key or a
    /// sequence with no surviving records.
    pub fn prune_and_get(&self, key: &str, now: DateTime<Utc>) -> Lookup<R> {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Lookup::Miss;
        };

        let before = entry.len();
        entry.retain(|record| record.is_valid(now));
        if entry.len() < before {
            debug!(key = %key, pruned = before - entry.len(), "Pruned expired cache entries");
        }

        if entry.is_empty() {
            Lookup::Miss
        } else {
            Lookup::Hit(entry.clone())
        }
    }

    /// Make the records currently stored for `canonical` retrievable under
    /// `key` as well. This is a snapshot copy: later mutation of either key
    /// does not affect the other. A no-op when `canonical` has no entry.
    pub fn alias(&self, key: &str, canonical: &str) {
        // Clone before inserting so no two shard locks are held at once.
        let copied = self.entries.get(canonical).map(|entry| entry.clone());
        if let Some(records) = copied {
            debug!(key = %key, canonical = %canonical, "Aliasing cached records");
            self.entries.insert(key.to_string(), records);
        }
    }

    pub fn export(&self) -> HashMap<String, Vec<R>> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: CachedRecord + Clone> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// The two independent cache stores, keyed and persisted separately.
#[derive(Default)]
pub struct ResolverCaches {
    pub addresses: RecordStore<ARecord>,
    pub name_servers: RecordStore<NsRecord>,
}

impl ResolverCaches {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(
        addresses: HashMap<String, Vec<ARecord>>,
        name_servers: HashMap<String, Vec<NsRecord>>,
    ) -> Self {
        Self {
            addresses: RecordStore::from_entries(addresses),
            name_servers: RecordStore::from_entries(name_servers),
        }
    }
}
