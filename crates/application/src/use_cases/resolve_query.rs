use crate::cache::{Lookup, ResolverCaches};
use crate::ports::{CacheSnapshots, HarvestedRecord, UpstreamTransport};
use chrono::Utc;
use ember_dns_domain::{ARecord, CacheKind, DomainError, NsRecord};
use std::sync::Arc;
use tracing::{debug, warn};

/// One incoming question, reduced to what the engine needs: the (first)
/// question's name and cache-eligible kind, plus the original datagram for
/// verbatim forwarding.
#[derive(Debug, Clone)]
pub struct QueryInfo {
    pub name: String,
    pub kind: Option<CacheKind>,
    pub wire: Vec<u8>,
}

/// How a query was resolved. Hits carry the surviving cached records; the
/// wire conversion with decayed TTL happens at the protocol boundary.
#[derive(Debug, Clone)]
pub enum Resolution {
    AddressHit(Vec<ARecord>),
    NameServerHit(Vec<NsRecord>),
    Forwarded(Vec<u8>),
}

/// The resolution engine: cache dispatch, upstream forwarding, and
/// opportunistic cache population from whatever the upstream returns.
pub struct ResolveQueryUseCase {
    transport: Arc<dyn UpstreamTransport>,
    snapshots: Arc<dyn CacheSnapshots>,
    caches: Arc<ResolverCaches>,
}

impl ResolveQueryUseCase {
    pub fn new(
        transport: Arc<dyn UpstreamTransport>,
        snapshots: Arc<dyn CacheSnapshots>,
        caches: Arc<ResolverCaches>,
    ) -> Self {
        Self {
            transport,
            snapshots,
            caches,
        }
    }

    pub async fn execute(&self, query: &QueryInfo) -> Result<Resolution, DomainError> {
        let now = Utc::now();

        match query.kind {
            Some(kind @ CacheKind::Address) => {
                if let Lookup::Hit(records) = self.caches.addresses.prune_and_get(&query.name, now)
                {
                    debug!(domain = %query.name, kind = %kind, records = records.len(), "Cache hit");
                    return Ok(Resolution::AddressHit(records));
                }
                debug!(domain = %query.name, kind = %kind, "Cache miss");
            }
            Some(kind @ CacheKind::NameServer) => {
                if let Lookup::Hit(records) =
                    self.caches.name_servers.prune_and_get(&query.name, now)
                {
                    debug!(domain = %query.name, kind = %kind, records = records.len(), "Cache hit");
                    return Ok(Resolution::NameServerHit(records));
                }
                debug!(domain = %query.name, kind = %kind, "Cache miss");
            }
            // Not cache-eligible: straight to forwarding.
            None => {}
        }

        let answer = self.transport.forward(&query.wire).await?;
        self.populate(&answer.records);

        Ok(Resolution::Forwarded(answer.wire))
    }

    /// Populate both caches from an upstream response, in section order.
    /// CNAME records alias the canonical name's A entries when those are
    /// already cached (possibly earlier in this same response) and are
    /// dropped otherwise. Writes through to the snapshots afterwards.
    fn populate(&self, records: &[HarvestedRecord]) {
        let now = Utc::now();

        for record in records {
            match record {
                HarvestedRecord::Address { name, ttl_secs, ip } => {
                    self.caches.addresses.append(
                        name,
                        ARecord::new(name.clone(), *ip, *ttl_secs, now),
                    );
                }
                HarvestedRecord::NameServer {
                    name,
                    ttl_secs,
                    ns_domain,
                } => {
                    self.caches.name_servers.append(
                        name,
                        NsRecord::new(name.clone(), ns_domain.clone(), *ttl_secs, now),
                    );
                }
                HarvestedRecord::Alias { name, canonical } => {
                    self.caches.addresses.alias(name, canonical);
                }
            }
        }

        // The in-memory caches stay authoritative if the disk write fails.
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist cache snapshots");
        }
    }

    /// Write both cache snapshots to durable storage.
    pub fn persist(&self) -> Result<(), DomainError> {
        self.snapshots.save(
            &self.caches.addresses.export(),
            &self.caches.name_servers.export(),
        )
    }
}
