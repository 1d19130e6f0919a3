use ember_dns_domain::{ARecord, DomainError, NsRecord};
use std::collections::HashMap;

pub type AddressEntries = HashMap<String, Vec<ARecord>>;
pub type NameServerEntries = HashMap<String, Vec<NsRecord>>;

/// Port for durable cache snapshots.
pub trait CacheSnapshots: Send + Sync {
    /// Load both snapshots as a pair. `None` unless both files load — a
    /// partial pair is treated as total absence and both caches start empty.
    fn load(&self) -> Option<(AddressEntries, NameServerEntries)>;

    /// Persist both snapshots. Blocks the calling path; failure must be
    /// reported, not swallowed, so the caller can log and keep serving.
    fn save(&self, addresses: &AddressEntries, name_servers: &NameServerEntries)
        -> Result<(), DomainError>;
}
