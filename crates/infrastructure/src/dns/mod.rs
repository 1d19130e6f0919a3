pub mod forwarder;
pub mod server;
pub mod wire;

pub use forwarder::UdpForwarder;
pub use server::DnsServer;
