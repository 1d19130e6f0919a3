use super::wire;
use async_trait::async_trait;
use ember_dns_application::ports::{UpstreamAnswer, UpstreamTransport};
use ember_dns_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// One-shot UDP exchange with the fixed upstream resolver, on a fresh
/// ephemeral socket per query.
pub struct UdpForwarder {
    server: SocketAddr,
    timeout: Duration,
}

impl UdpForwarder {
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        Self { server, timeout }
    }
}

#[async_trait]
impl UpstreamTransport for UdpForwarder {
    async fn forward(&self, query: &[u8]) -> Result<UpstreamAnswer, DomainError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| DomainError::UpstreamIo(format!("Failed to bind socket: {}", e)))?;

        socket
            .connect(self.server)
            .await
            .map_err(|e| DomainError::UpstreamIo(format!("Failed to connect: {}", e)))?;

        socket
            .send(query)
            .await
            .map_err(|e| DomainError::UpstreamIo(format!("Failed to send query: {}", e)))?;

        let mut response_buf = vec![0u8; 4096];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut response_buf))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| DomainError::UpstreamIo(format!("Failed to receive: {}", e)))?;

        let message = wire::decode_response(&response_buf[..len])?;
        let records = wire::harvest_records(&message);

        debug!(
            upstream = %self.server,
            bytes = len,
            harvested = records.len(),
            "Upstream exchange complete"
        );

        Ok(UpstreamAnswer {
            wire: response_buf[..len].to_vec(),
            records,
        })
    }
}
