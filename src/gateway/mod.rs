// Gateway module - Client Bridge
// Signs proposals, evaluates queries and submits transactions for commit

mod client;
mod connection;
mod proposal;

pub use client::ContractClient;
pub use connection::{
    Endorsement, Gateway, GatewayConfig, GatewayError, GatewayEvent, GatewayStats, SubmitResult,
};
pub use proposal::Proposal;
