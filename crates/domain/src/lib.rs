//! Ember DNS Domain Layer
pub mod config;
pub mod errors;
pub mod record;
pub mod record_kind;

pub use config::{CliOverrides, Config};
pub use errors::DomainError;
pub use record::{ARecord, CachedRecord, NsRecord};
pub use record_kind::CacheKind;
