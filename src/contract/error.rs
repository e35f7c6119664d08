use crate::contract::Action;
use crate::ledger::LedgerError;
use crate::model::RepresentationStatus;
use thiserror::Error;

/// Coarse classification of a failed invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Malformed,
    ConflictAbort,
    InvalidTransition,
    InvalidArgument,
    Unauthorized,
    Internal,
}

/// Errors returned by contract handlers
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("the {kind} {id} does not exist")]
    NotFound { kind: &'static str, id: String },

    #[error("the {kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("failed to decode {kind} at {key}: {reason}")]
    Malformed {
        kind: &'static str,
        key: String,
        reason: String,
    },

    #[error("representation {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: RepresentationStatus,
        to: RepresentationStatus,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{caller} may not {action} {subject}")]
    Unauthorized {
        caller: String,
        action: Action,
        subject: String,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::InvalidArgument(_) | Self::UnknownFunction(_) => ErrorKind::InvalidArgument,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Ledger(LedgerError::Conflict { .. }) => ErrorKind::ConflictAbort,
            Self::Ledger(LedgerError::InvalidKey(_)) => ErrorKind::InvalidArgument,
            Self::Ledger(_) => ErrorKind::Internal,
        }
    }
}
