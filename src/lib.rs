// Estate Ledger - real-estate marketplace state machine over a versioned ledger
//
// Modules, leaves first:
// - identity: signing keys and caller identities
// - ledger:   world state, per-transaction stub, optimistic commit
// - storage:  sled-backed world state
// - model:    Property, Bid, Representation records
// - contract: transactional entry points and range queries
// - gateway:  proposals, evaluate/submit, conflict resubmission

pub mod contract;
pub mod gateway;
pub mod identity;
pub mod ledger;
pub mod model;
pub mod storage;
