use async_trait::async_trait;
use ember_dns_domain::DomainError;
use std::net::IpAddr;

/// A cache-relevant record harvested from an upstream response, across its
/// answer, additional, and authority sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestedRecord {
    Address {
        name: String,
        ttl_secs: u32,
        ip: IpAddr,
    },
    NameServer {
        name: String,
        ttl_secs: u32,
        ns_domain: String,
    },
    Alias {
        name: String,
        canonical: String,
    },
}

/// An upstream reply: the verbatim datagram to relay back to the requester,
/// plus the records harvested from it for cache population.
#[derive(Debug, Clone)]
pub struct UpstreamAnswer {
    pub wire: Vec<u8>,
    pub records: Vec<HarvestedRecord>,
}

/// Port for the one-shot UDP exchange with the fixed upstream resolver.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Send the original query bytes verbatim and await one reply datagram.
    async fn forward(&self, query: &[u8]) -> Result<UpstreamAnswer, DomainError>;
}
