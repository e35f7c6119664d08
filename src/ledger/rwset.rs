// Read/write set - what a transaction observed and what it wants to write
//
// Validation is optimistic: nothing is locked while a handler runs. At commit
// time the world state re-checks every recorded version, and the transaction
// aborts if anything it depended on moved.

use crate::ledger::key::display_key;
use crate::ledger::LedgerError;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Commit height at which a value was last written
pub type Version = u64;

/// Versioned lookups a world state offers to commit validation
pub trait VersionLookup {
    fn version_of(&self, key: &[u8]) -> Result<Option<Version>, LedgerError>;
    fn versions_in(&self, low: &[u8], high: &[u8]) -> Result<Vec<(Vec<u8>, Version)>, LedgerError>;
}

/// Range bounds where an empty slice means "unbounded"
pub fn range_bounds<'a>(low: &'a [u8], high: &'a [u8]) -> (Bound<&'a [u8]>, Bound<&'a [u8]>) {
    let start = if low.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(low)
    };
    let end = if high.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(high)
    };
    (start, end)
}

/// True when `[low, high)` cannot contain any key
pub fn is_empty_range(low: &[u8], high: &[u8]) -> bool {
    !high.is_empty() && low >= high
}

pub fn in_range(key: &[u8], low: &[u8], high: &[u8]) -> bool {
    key >= low && (high.is_empty() || key < high)
}

/// A range scan and the exact (key, version) sequence it returned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeRead {
    pub low: Vec<u8>,
    pub high: Vec<u8>,
    pub observed: Vec<(Vec<u8>, Version)>,
}

#[derive(Clone, Debug, Default)]
pub struct ReadWriteSet {
    reads: BTreeMap<Vec<u8>, Option<Version>>,
    ranges: Vec<RangeRead>,
    writes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl ReadWriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the committed version seen for `key`; the first observation wins
    pub fn record_read(&mut self, key: &[u8], version: Option<Version>) {
        self.reads.entry(key.to_vec()).or_insert(version);
    }

    pub fn record_range(&mut self, low: &[u8], high: &[u8], observed: Vec<(Vec<u8>, Version)>) {
        self.ranges.push(RangeRead {
            low: low.to_vec(),
            high: high.to_vec(),
            observed,
        });
    }

    pub fn write(&mut self, key: &[u8], document: Vec<u8>) {
        self.writes.insert(key.to_vec(), document);
    }

    /// A value this transaction already wrote, if any
    pub fn pending_write(&self, key: &[u8]) -> Option<&[u8]> {
        self.writes.get(key).map(Vec::as_slice)
    }

    pub fn writes_in<'a>(
        &'a self,
        low: &'a [u8],
        high: &'a [u8],
    ) -> impl Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)> + 'a {
        self.writes
            .iter()
            .filter(move |(key, _)| in_range(key, low, high))
    }

    pub fn reads(&self) -> &BTreeMap<Vec<u8>, Option<Version>> {
        &self.reads
    }

    pub fn ranges(&self) -> &[RangeRead] {
        &self.ranges
    }

    pub fn writes(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.writes
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Check every read and range against current committed state
    pub fn validate<L: VersionLookup + ?Sized>(&self, lookup: &L) -> Result<(), LedgerError> {
        for (key, seen) in &self.reads {
            if lookup.version_of(key)? != *seen {
                return Err(LedgerError::Conflict {
                    key: display_key(key),
                });
            }
        }

        for range in &self.ranges {
            if lookup.versions_in(&range.low, &range.high)? != range.observed {
                return Err(LedgerError::Conflict {
                    key: format!(
                        "range [{}, {})",
                        display_key(&range.low),
                        display_key(&range.high)
                    ),
                });
            }
        }

        Ok(())
    }
}
