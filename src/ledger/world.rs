// World state - the committed, versioned key-value store behind every transaction

use crate::ledger::key::display_key;
use crate::ledger::rwset::{is_empty_range, range_bounds, ReadWriteSet, Version, VersionLookup};
use crate::ledger::stub::TxId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the ledger layer
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Optimistic-concurrency abort: something this transaction read was
    /// changed by a transaction that committed first
    #[error("Read conflict on {key}: transaction must be resubmitted")]
    Conflict { key: String },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// A committed document and the height at which it was written
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    pub version: Version,
    pub document: Vec<u8>,
}

/// Outcome of a successful commit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: TxId,
    /// Height assigned to this commit; also the version of every key it wrote
    pub height: u64,
    pub writes: usize,
}

/// Committed ledger state
///
/// `commit` must validate and apply atomically with respect to other commits:
/// either every write lands under one new height, or nothing changes.
pub trait WorldState: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<VersionedValue>, LedgerError>;

    /// Snapshot of `[low, high)` in key order; empty bounds are open-ended
    fn scan(&self, low: &[u8], high: &[u8]) -> Result<Vec<(Vec<u8>, VersionedValue)>, LedgerError>;

    /// Height of the last commit (0 for an empty ledger)
    fn height(&self) -> Result<u64, LedgerError>;

    fn commit(&self, tx_id: &TxId, rwset: &ReadWriteSet) -> Result<CommitReceipt, LedgerError>;
}

type Entries = BTreeMap<Vec<u8>, VersionedValue>;

impl VersionLookup for Entries {
    fn version_of(&self, key: &[u8]) -> Result<Option<Version>, LedgerError> {
        Ok(self.get(key).map(|v| v.version))
    }

    fn versions_in(&self, low: &[u8], high: &[u8]) -> Result<Vec<(Vec<u8>, Version)>, LedgerError> {
        if is_empty_range(low, high) {
            return Ok(Vec::new());
        }
        Ok(self
            .range::<[u8], _>(range_bounds(low, high))
            .map(|(key, value)| (key.clone(), value.version))
            .collect())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: Entries,
    height: u64,
}

/// In-memory world state for tests and embedded use
#[derive(Debug, Default)]
pub struct MemoryWorldState {
    inner: RwLock<MemoryInner>,
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(inner.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}

impl WorldState for MemoryWorldState {
    fn get(&self, key: &[u8]) -> Result<Option<VersionedValue>, LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(inner.entries.get(key).cloned())
    }

    fn scan(&self, low: &[u8], high: &[u8]) -> Result<Vec<(Vec<u8>, VersionedValue)>, LedgerError> {
        if is_empty_range(low, high) {
            return Ok(Vec::new());
        }
        let inner = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(inner
            .entries
            .range::<[u8], _>(range_bounds(low, high))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn height(&self) -> Result<u64, LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(inner.height)
    }

    fn commit(&self, tx_id: &TxId, rwset: &ReadWriteSet) -> Result<CommitReceipt, LedgerError> {
        let mut guard = self.inner.write().map_err(|_| LedgerError::LockPoisoned)?;
        let inner = &mut *guard;

        if let Err(e) = rwset.validate(&inner.entries) {
            warn!(tx_id = %tx_id, error = %e, "commit aborted");
            return Err(e);
        }

        let height = inner.height + 1;
        for (key, document) in rwset.writes() {
            inner.entries.insert(
                key.clone(),
                VersionedValue {
                    version: height,
                    document: document.clone(),
                },
            );
        }
        inner.height = height;

        info!(
            tx_id = %tx_id,
            height,
            writes = rwset.writes().len(),
            keys = ?rwset.writes().keys().map(|k| display_key(k)).collect::<Vec<_>>(),
            "committed"
        );
        Ok(CommitReceipt {
            tx_id: tx_id.clone(),
            height,
            writes: rwset.writes().len(),
        })
    }
}
