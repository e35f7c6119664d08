// Ledger stub - the per-transaction capability handed to contract handlers
//
// Handlers never see the world state directly. Everything they can do to the
// ledger (read, write, scan, ask for the transaction time or the caller) goes
// through this trait, so a test can drive them with an in-memory backend.

use crate::identity::{ClientIdentity, PublicKey};
use crate::ledger::LedgerError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Transaction identifier: hex(sha256(nonce | creator public key))
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(String);

impl TxId {
    pub fn derive(nonce: &[u8], creator: &PublicKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(creator.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn from_string(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Execution context fixed by the proposal before any handler runs
///
/// The timestamp is chosen once by the proposing client. Every party that
/// re-executes the transaction sees the same value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxHeader {
    pub tx_id: TxId,
    pub timestamp: DateTime<Utc>,
    pub creator: ClientIdentity,
}

impl TxHeader {
    pub fn new(tx_id: TxId, timestamp: DateTime<Utc>, creator: ClientIdentity) -> Self {
        Self {
            tx_id,
            timestamp,
            creator,
        }
    }
}

/// Format a transaction timestamp the way it is stored in documents
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Ordered (key, document) pairs from a range scan
///
/// Holds the snapshot taken when the scan was opened. Drop it or call
/// `close` to release it.
#[derive(Debug)]
pub struct StateIterator {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl StateIterator {
    pub(crate) fn new(entries: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.entries.len() > 0
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    pub fn close(self) {}
}

impl Iterator for StateIterator {
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

/// Ledger access scoped to one transaction
pub trait LedgerStub {
    fn tx_id(&self) -> &TxId;

    /// Deterministic transaction time; never read a local clock instead
    fn tx_timestamp(&self) -> DateTime<Utc>;

    /// Identity that signed the proposal
    fn creator(&self) -> &ClientIdentity;

    fn exists(&mut self, key: &[u8]) -> Result<bool, LedgerError> {
        Ok(self.get(key)?.is_some())
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Full overwrite of `key`; visible to later reads in this transaction
    fn put(&mut self, key: &[u8], document: Vec<u8>) -> Result<(), LedgerError>;

    /// Scan `[low, high)` in key order; empty bounds are open-ended
    fn range_scan(&mut self, low: &[u8], high: &[u8]) -> Result<StateIterator, LedgerError>;
}
