#![allow(dead_code)]

use async_trait::async_trait;
use ember_dns_application::ports::{
    AddressEntries, CacheSnapshots, NameServerEntries, UpstreamAnswer, UpstreamTransport,
};
use ember_dns_domain::DomainError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Upstream transport returning a canned answer or error, counting calls.
pub struct MockUpstreamTransport {
    answer: Mutex<Option<Result<UpstreamAnswer, DomainError>>>,
    calls: AtomicUsize,
}

impl MockUpstreamTransport {
    pub fn new() -> Self {
        Self {
            answer: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_answer(&self, answer: UpstreamAnswer) {
        *self.answer.lock().unwrap() = Some(Ok(answer));
    }

    pub fn set_error(&self, error: DomainError) {
        *self.answer.lock().unwrap() = Some(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockUpstreamTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamTransport for MockUpstreamTransport {
    async fn forward(&self, _query: &[u8]) -> Result<UpstreamAnswer, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(DomainError::UpstreamIo("no canned answer".to_string())))
    }
}

/// Snapshot store recording every save, optionally failing.
pub struct MockSnapshotStore {
    pub saves: Mutex<Vec<(AddressEntries, NameServerEntries)>>,
    preloaded: Option<(AddressEntries, NameServerEntries)>,
    fail_saves: bool,
}

impl MockSnapshotStore {
    pub fn new() -> Self {
        Self {
            saves: Mutex::new(Vec::new()),
            preloaded: None,
            fail_saves: false,
        }
    }

    pub fn with_preloaded(addresses: AddressEntries, name_servers: NameServerEntries) -> Self {
        Self {
            saves: Mutex::new(Vec::new()),
            preloaded: Some((addresses, name_servers)),
            fail_saves: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            saves: Mutex::new(Vec::new()),
            preloaded: None,
            fail_saves: true,
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_save(&self) -> Option<(AddressEntries, NameServerEntries)> {
        self.saves.lock().unwrap().last().cloned()
    }
}

impl Default for MockSnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheSnapshots for MockSnapshotStore {
    fn load(&self) -> Option<(AddressEntries, NameServerEntries)> {
        self.preloaded.clone()
    }

    fn save(
        &self,
        addresses: &AddressEntries,
        name_servers: &NameServerEntries,
    ) -> Result<(), DomainError> {
        if self.fail_saves {
            return Err(DomainError::SnapshotError("disk full".to_string()));
        }
        self.saves
            .lock()
            .unwrap()
            .push((addresses.clone(), name_servers.clone()));
        Ok(())
    }
}
