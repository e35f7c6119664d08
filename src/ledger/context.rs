// Transaction context - simulates one transaction against a world state

use crate::identity::ClientIdentity;
use crate::ledger::key::display_key;
use crate::ledger::rwset::ReadWriteSet;
use crate::ledger::stub::{LedgerStub, StateIterator, TxHeader, TxId};
use crate::ledger::{LedgerError, WorldState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Runs handler reads and writes against committed state, buffering writes
/// in a read/write set that the world state validates on commit
pub struct TxContext<'a> {
    world: &'a dyn WorldState,
    header: TxHeader,
    rwset: ReadWriteSet,
}

impl<'a> TxContext<'a> {
    pub fn new(world: &'a dyn WorldState, header: TxHeader) -> Self {
        Self {
            world,
            header,
            rwset: ReadWriteSet::new(),
        }
    }

    pub fn header(&self) -> &TxHeader {
        &self.header
    }

    pub fn rwset(&self) -> &ReadWriteSet {
        &self.rwset
    }

    /// Finish simulation, handing back what was read and written
    pub fn into_rwset(self) -> ReadWriteSet {
        self.rwset
    }
}

impl LedgerStub for TxContext<'_> {
    fn tx_id(&self) -> &TxId {
        &self.header.tx_id
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp
    }

    fn creator(&self) -> &ClientIdentity {
        &self.header.creator
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError> {
        if let Some(pending) = self.rwset.pending_write(key) {
            return Ok(Some(pending.to_vec()));
        }

        let committed = self.world.get(key)?;
        self.rwset
            .record_read(key, committed.as_ref().map(|v| v.version));
        debug!(
            tx_id = %self.header.tx_id,
            key = %display_key(key),
            found = committed.is_some(),
            "get"
        );
        Ok(committed.map(|v| v.document))
    }

    fn put(&mut self, key: &[u8], document: Vec<u8>) -> Result<(), LedgerError> {
        debug!(
            tx_id = %self.header.tx_id,
            key = %display_key(key),
            bytes = document.len(),
            "put"
        );
        self.rwset.write(key, document);
        Ok(())
    }

    fn range_scan(&mut self, low: &[u8], high: &[u8]) -> Result<StateIterator, LedgerError> {
        let committed = self.world.scan(low, high)?;
        self.rwset.record_range(
            low,
            high,
            committed
                .iter()
                .map(|(key, value)| (key.clone(), value.version))
                .collect(),
        );

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = committed
            .into_iter()
            .map(|(key, value)| (key, value.document))
            .collect();
        for (key, document) in self.rwset.writes_in(low, high) {
            merged.insert(key.clone(), document.clone());
        }

        debug!(
            tx_id = %self.header.tx_id,
            low = %display_key(low),
            high = %display_key(high),
            entries = merged.len(),
            "range_scan"
        );
        Ok(StateIterator::new(merged.into_iter().collect()))
    }
}
