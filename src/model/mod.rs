// Model module - the records stored in the world state

mod property;
mod representation;

pub use property::{Bid, Property, PropertyState};
pub use representation::{Representation, RepresentationStatus, TransitionPolicy};

use crate::ledger::EntityKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Rule violations detected on a record
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("the bid {0} already exists")]
    BidExists(String),

    #[error("bid {0} does not exist")]
    BidNotFound(String),

    #[error("cannot move from {from} to {to}")]
    InvalidTransition {
        from: RepresentationStatus,
        to: RepresentationStatus,
    },

    #[error("inconsistent record: {0}")]
    Inconsistent(String),
}

/// A record stored under its own key namespace
pub trait Entity: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Invariants a decoded document must satisfy
    fn check(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
