// LedgerStore - Persistent world state using sled
//
// Two trees:
// - world_state: composite key -> postcard(VersionedValue)
// - meta: commit height and the local client keypair

use crate::identity::Keypair;
use crate::ledger::{
    display_key, is_empty_range, range_bounds, CommitReceipt, LedgerError, ReadWriteSet, TxId,
    Version, VersionLookup, VersionedValue, WorldState,
};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

mod trees {
    pub const WORLD_STATE: &[u8] = b"world_state";
    pub const META: &[u8] = b"meta";
}

/// Keys inside the meta tree
mod keys {
    pub const HEIGHT: &[u8] = b"ledger:height";
    pub const CLIENT_KEYPAIR_PREFIX: &[u8] = b"identity:keypair:";
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Configuration for the sled-backed store
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Directory holding the database
    pub path: PathBuf,
    /// sled page cache size in bytes
    pub cache_capacity: u64,
    /// Flush to disk after every commit
    pub flush_on_commit: bool,
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache_capacity: 64 * 1024 * 1024,
            flush_on_commit: true,
        }
    }

    pub fn with_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    pub fn with_flush_on_commit(mut self, flush: bool) -> Self {
        self.flush_on_commit = flush;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.path.as_os_str().is_empty() {
            return Err(LedgerError::Storage("store path cannot be empty".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(LedgerError::Storage("cache_capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of world-state keys
    pub key_count: usize,
    /// Height of the last commit
    pub height: u64,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Persistent world state
///
/// Validation and apply run under `commit_lock`, so two commits in this
/// process never interleave. Writes and the new height land in one sled
/// transaction across both trees.
pub struct LedgerStore {
    db: sled::Db,
    state: sled::Tree,
    meta: sled::Tree,
    commit_lock: Mutex<()>,
    flush_on_commit: bool,
}

fn encode(value: &VersionedValue) -> Result<Vec<u8>, LedgerError> {
    postcard::to_allocvec(value).map_err(|e| LedgerError::Encoding(e.to_string()))
}

fn decode(key: &[u8], bytes: &[u8]) -> Result<VersionedValue, LedgerError> {
    postcard::from_bytes(bytes)
        .map_err(|e| LedgerError::Encoding(format!("{}: {}", display_key(key), e)))
}

fn decode_height(bytes: &[u8]) -> Result<u64, LedgerError> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LedgerError::Encoding("invalid height length".to_string()))?;
    Ok(u64::from_be_bytes(array))
}

impl LedgerStore {
    /// Open or create a store at the given path with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        Self::open_with_config(&StoreConfig::new(path))
    }

    pub fn open_with_config(config: &StoreConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .open()
            .map_err(|e| LedgerError::Storage(format!("failed to open database: {}", e)))?;
        let state = db.open_tree(trees::WORLD_STATE)?;
        let meta = db.open_tree(trees::META)?;

        Ok(Self {
            db,
            state,
            meta,
            commit_lock: Mutex::new(()),
            flush_on_commit: config.flush_on_commit,
        })
    }

    /// Check if no world-state key has been written
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), LedgerError> {
        self.db.flush()?;
        Ok(())
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, LedgerError> {
        Ok(StorageStats {
            key_count: self.state.len(),
            height: self.height()?,
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        })
    }

    // ========================================================================
    // CLIENT IDENTITY PERSISTENCE
    // ========================================================================

    /// Save the keypair a named client signs with
    pub fn save_keypair(&self, name: &str, keypair: &Keypair) -> Result<(), LedgerError> {
        let key = [keys::CLIENT_KEYPAIR_PREFIX, name.as_bytes()].concat();
        self.meta.insert(key, keypair.to_bytes().to_vec())?;
        Ok(())
    }

    /// Load the keypair of a named client
    pub fn load_keypair(&self, name: &str) -> Result<Option<Keypair>, LedgerError> {
        let key = [keys::CLIENT_KEYPAIR_PREFIX, name.as_bytes()].concat();
        match self.meta.get(key)? {
            Some(bytes) => Keypair::from_bytes(&bytes)
                .map(Some)
                .map_err(|e| LedgerError::Encoding(e.to_string())),
            None => Ok(None),
        }
    }

    /// Get the keypair of a named client, creating one if it doesn't exist
    pub fn get_or_create_keypair(&self, name: &str) -> Result<Keypair, LedgerError> {
        if let Some(keypair) = self.load_keypair(name)? {
            return Ok(keypair);
        }

        let keypair = Keypair::generate();
        self.save_keypair(name, &keypair)?;
        Ok(keypair)
    }
}

impl VersionLookup for sled::Tree {
    fn version_of(&self, key: &[u8]) -> Result<Option<Version>, LedgerError> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(decode(key, &bytes)?.version)),
            None => Ok(None),
        }
    }

    fn versions_in(&self, low: &[u8], high: &[u8]) -> Result<Vec<(Vec<u8>, Version)>, LedgerError> {
        if is_empty_range(low, high) {
            return Ok(Vec::new());
        }
        let mut versions = Vec::new();
        for item in self.range::<&[u8], _>(range_bounds(low, high)) {
            let (key, bytes) = item?;
            versions.push((key.to_vec(), decode(&key, &bytes)?.version));
        }
        Ok(versions)
    }
}

impl WorldState for LedgerStore {
    fn get(&self, key: &[u8]) -> Result<Option<VersionedValue>, LedgerError> {
        match self.state.get(key)? {
            Some(bytes) => Ok(Some(decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    fn scan(&self, low: &[u8], high: &[u8]) -> Result<Vec<(Vec<u8>, VersionedValue)>, LedgerError> {
        if is_empty_range(low, high) {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for item in self.state.range::<&[u8], _>(range_bounds(low, high)) {
            let (key, bytes) = item?;
            let value = decode(&key, &bytes)?;
            entries.push((key.to_vec(), value));
        }
        Ok(entries)
    }

    fn height(&self) -> Result<u64, LedgerError> {
        match self.meta.get(keys::HEIGHT)? {
            Some(bytes) => decode_height(&bytes),
            None => Ok(0),
        }
    }

    fn commit(&self, tx_id: &TxId, rwset: &ReadWriteSet) -> Result<CommitReceipt, LedgerError> {
        let _guard = self.commit_lock.lock().map_err(|_| LedgerError::LockPoisoned)?;

        if let Err(e) = rwset.validate(&self.state) {
            warn!(tx_id = %tx_id, error = %e, "commit aborted");
            return Err(e);
        }

        let height = self.height()? + 1;
        let mut encoded = Vec::with_capacity(rwset.writes().len());
        for (key, document) in rwset.writes() {
            let value = VersionedValue {
                version: height,
                document: document.clone(),
            };
            encoded.push((key.clone(), encode(&value)?));
        }

        let applied: Result<(), TransactionError<()>> =
            (&self.state, &self.meta).transaction(|(state, meta)| {
                for (key, bytes) in &encoded {
                    state.insert(key.as_slice(), bytes.as_slice())?;
                }
                meta.insert(keys::HEIGHT, height.to_be_bytes().to_vec())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            });
        applied.map_err(|e| LedgerError::Storage(format!("commit failed: {:?}", e)))?;

        if self.flush_on_commit {
            self.flush()?;
        }

        info!(tx_id = %tx_id, height, writes = encoded.len(), "committed");
        Ok(CommitReceipt {
            tx_id: tx_id.clone(),
            height,
            writes: encoded.len(),
        })
    }
}
