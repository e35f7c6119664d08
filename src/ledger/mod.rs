// Ledger module - THE WORLD STATE
// Versioned key-value state, per-transaction access and optimistic commit

mod context;
mod key;
mod rwset;
mod stub;
mod world;

pub use context::TxContext;
pub use key::{display_key, CompositeKey, EntityKind};
pub use rwset::{in_range, is_empty_range, range_bounds, RangeRead, ReadWriteSet, Version, VersionLookup};
pub use stub::{format_timestamp, LedgerStub, StateIterator, TxHeader, TxId};
pub use world::{CommitReceipt, LedgerError, MemoryWorldState, VersionedValue, WorldState};
