use super::wire;
use chrono::Utc;
use ember_dns_application::use_cases::{QueryInfo, Resolution, ResolveQueryUseCase};
use ember_dns_domain::{CacheKind, DomainError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// The UDP front end. One socket, one receive loop, one task per datagram.
///
/// Malformed or unanswerable queries are logged and dropped without a
/// response; the loop itself never exits on a per-query error.
pub struct DnsServer {
    socket: Arc<UdpSocket>,
    engine: Arc<ResolveQueryUseCase>,
}

impl DnsServer {
    pub async fn bind(
        addr: SocketAddr,
        engine: Arc<ResolveQueryUseCase>,
    ) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(addr = %addr, "DNS server listening on UDP");

        Ok(Self {
            socket: Arc::new(socket),
            engine,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn run(&self) {
        let mut buf = vec![0u8; 4096];

        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "Failed to receive datagram");
                    continue;
                }
            };

            let datagram = buf[..len].to_vec();
            let socket = Arc::clone(&self.socket);
            let engine = Arc::clone(&self.engine);

            tokio::spawn(async move {
                match handle_datagram(&engine, datagram, peer).await {
                    Ok(response) => {
                        if let Err(e) = socket.send_to(&response, peer).await {
                            warn!(peer = %peer, error = %e, "Failed to send response");
                        }
                    }
                    Err(e) => {
                        warn!(peer = %peer, error = %e, "Dropping query");
                    }
                }
            });
        }
    }
}

async fn handle_datagram(
    engine: &ResolveQueryUseCase,
    datagram: Vec<u8>,
    peer: SocketAddr,
) -> Result<Vec<u8>, DomainError> {
    let parsed = wire::decode_query(&datagram)?;
    let kind = CacheKind::from_type_code(parsed.type_code);
    debug!(
        id = parsed.message.id(),
        peer = %peer,
        domain = %parsed.name,
        kind = kind.map_or("other", |k| k.as_str()),
        type_code = parsed.type_code,
        "Query received"
    );

    let query = QueryInfo {
        name: parsed.name,
        kind,
        wire: datagram,
    };

    match engine.execute(&query).await? {
        Resolution::AddressHit(records) => {
            wire::build_address_response(&parsed.message, &records, Utc::now())
        }
        Resolution::NameServerHit(records) => {
            wire::build_name_server_response(&parsed.message, &records, Utc::now())
        }
        Resolution::Forwarded(response) => Ok(response),
    }
}
