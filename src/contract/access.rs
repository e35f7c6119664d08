// Access control hook
//
// Handlers ask the configured policy before changing anything. The crate
// ships no rules of its own: `AllowAll` admits every caller.

use crate::contract::ContractError;
use crate::identity::ClientIdentity;
use std::fmt;

/// State-changing actions a policy can gate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    RegisterProperty,
    ListProperty,
    PlaceBid,
    RejectBid,
    CounterBid,
    RequestRepresentation,
    DeclineRepresentation,
    AcceptRepresentation,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RegisterProperty => "register property",
            Self::ListProperty => "list property",
            Self::PlaceBid => "place bid on",
            Self::RejectBid => "reject bid on",
            Self::CounterBid => "counter bid on",
            Self::RequestRepresentation => "request representation",
            Self::DeclineRepresentation => "decline representation",
            Self::AcceptRepresentation => "accept representation",
        };
        f.write_str(name)
    }
}

pub trait AccessPolicy: Send + Sync {
    /// `subject` is the id of the property or representation acted on
    fn authorize(
        &self,
        caller: &ClientIdentity,
        action: Action,
        subject: &str,
    ) -> Result<(), ContractError>;
}

/// Admits every caller
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn authorize(&self, _caller: &ClientIdentity, _action: Action, _subject: &str) -> Result<(), ContractError> {
        Ok(())
    }
}
