use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Query has no question section")]
    EmptyQuestion,

    #[error("Upstream query timeout")]
    QueryTimeout,

    #[error("Upstream transport error: {0}")]
    UpstreamIo(String),

    #[error("Cache snapshot error: {0}")]
    SnapshotError(String),
}
