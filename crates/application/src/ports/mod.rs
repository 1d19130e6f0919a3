mod cache_snapshots;
mod upstream_transport;

pub use cache_snapshots::{AddressEntries, CacheSnapshots, NameServerEntries};
pub use upstream_transport::{HarvestedRecord, UpstreamAnswer, UpstreamTransport};
