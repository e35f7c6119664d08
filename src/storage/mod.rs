// Storage module - PERSISTENCE
// Durable world state using sled

mod store;

pub use store::{LedgerStore, StorageStats, StoreConfig};
