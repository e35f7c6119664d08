// Contract module - THE STATE MACHINE
// Transactional entry points for properties, bids and representations

mod access;
mod documents;
mod error;
mod estate;
mod invocation;
mod property;
mod query;
mod representation;

pub use access::{AccessPolicy, Action, AllowAll};
pub use error::{ContractError, ErrorKind};
pub use estate::{ContractConfig, RealEstateContract};
pub use invocation::{Invocation, FUNCTIONS};
pub use query::{scan_all, scan_filtered};
