use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::net::IpAddr;

/// Common behavior of cached records.
///
/// Expiry is a pure function of the record's creation time and TTL and is
/// evaluated lazily at read time — there is no background sweep.
pub trait CachedRecord {
    fn ttl_secs(&self) -> u32;
    fn created_at(&self) -> DateTime<Utc>;

    fn expires_at(&self) -> DateTime<Utc> {
        self.created_at() + Duration::seconds(self.ttl_secs() as i64)
    }

    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() > now
    }

    /// TTL left at `now`, saturating at zero. A record converted to wire
    /// form long after caching reports a shrunken TTL to the querying peer.
    fn remaining_ttl(&self, now: DateTime<Utc>) -> u32 {
        let left = (self.expires_at() - now).num_seconds();
        left.clamp(0, u32::MAX as i64) as u32
    }
}

/// A cached address (A) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ARecord {
    pub domain: String,
    pub ip: IpAddr,
    pub ttl_secs: u32,
    pub created_at: DateTime<Utc>,
}

impl ARecord {
    pub fn new(domain: String, ip: IpAddr, ttl_secs: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            domain,
            ip,
            ttl_secs,
            created_at,
        }
    }
}

impl CachedRecord for ARecord {
    fn ttl_secs(&self) -> u32 {
        self.ttl_secs
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Identity is (domain, ip). Two records for the same name and address are
// the same record regardless of when they were cached.
impl PartialEq for ARecord {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.ip == other.ip
    }
}

impl Eq for ARecord {}

impl Hash for ARecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.ip.hash(state);
    }
}

/// A cached nameserver (NS) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NsRecord {
    pub domain: String,
    pub ns_domain: String,
    pub ttl_secs: u32,
    pub created_at: DateTime<Utc>,
}

impl NsRecord {
    pub fn new(
        domain: String,
        ns_domain: String,
        ttl_secs: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            domain,
            ns_domain,
            ttl_secs,
            created_at,
        }
    }
}

impl CachedRecord for NsRecord {
    fn ttl_secs(&self) -> u32 {
        self.ttl_secs
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Identity is (domain, ns_domain), timing fields excluded.
impl PartialEq for NsRecord {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.ns_domain == other.ns_domain
    }
}

impl Eq for NsRecord {}

impl Hash for NsRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.ns_domain.hash(state);
    }
}
