use ember_dns_application::ports::{AddressEntries, CacheSnapshots, NameServerEntries};
use ember_dns_domain::DomainError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const A_CACHE_FILE: &str = "a_cache.json";
const NS_CACHE_FILE: &str = "ns_cache.json";

/// Cache snapshots as a pair of JSON files in a configured directory.
///
/// The pair is loaded all-or-nothing: a missing or unreadable file on either
/// side means a cold start with empty caches. Saves go through a temp file
/// and rename so a crash mid-write never clobbers the previous snapshot.
pub struct JsonSnapshotStore {
    directory: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn a_cache_path(&self) -> PathBuf {
        self.directory.join(A_CACHE_FILE)
    }

    fn ns_cache_path(&self) -> PathBuf {
        self.directory.join(NS_CACHE_FILE)
    }
}

impl CacheSnapshots for JsonSnapshotStore {
    fn load(&self) -> Option<(AddressEntries, NameServerEntries)> {
        let addresses: AddressEntries = read_json(&self.a_cache_path())?;
        let name_servers: NameServerEntries = read_json(&self.ns_cache_path())?;

        info!(
            a_keys = addresses.len(),
            ns_keys = name_servers.len(),
            "Loaded cache snapshots"
        );
        Some((addresses, name_servers))
    }

    fn save(
        &self,
        addresses: &AddressEntries,
        name_servers: &NameServerEntries,
    ) -> Result<(), DomainError> {
        write_json(&self.a_cache_path(), addresses)?;
        write_json(&self.ns_cache_path(), name_servers)?;

        debug!(
            a_keys = addresses.len(),
            ns_keys = name_servers.len(),
            "Saved cache snapshots"
        );
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Snapshot file not readable");
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Snapshot file corrupt, ignoring");
            None
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), DomainError> {
    let json = serde_json::to_string(value)
        .map_err(|e| DomainError::SnapshotError(format!("Failed to serialize: {}", e)))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(|e| {
        DomainError::SnapshotError(format!("Failed to write {}: {}", tmp_path.display(), e))
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        DomainError::SnapshotError(format!("Failed to rename into {}: {}", path.display(), e))
    })?;

    Ok(())
}
