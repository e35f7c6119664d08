// RealEstateContract - entry points over the ledger stub

use crate::contract::{AccessPolicy, Action, AllowAll, ContractError, Invocation};
use crate::ledger::LedgerStub;
use crate::model::TransitionPolicy;
use serde::Serialize;

/// Configuration for contract behaviour
#[derive(Clone, Debug, Default)]
pub struct ContractConfig {
    /// How accept/decline treat the current representation status
    pub transition_policy: TransitionPolicy,
}

impl ContractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }
}

/// The real-estate state machine
///
/// Holds no ledger state. Each handler reads what it needs through the stub,
/// checks preconditions, and issues at most one put per entity, so a failure
/// leaves nothing in the transaction's write set for that entity.
pub struct RealEstateContract {
    config: ContractConfig,
    access: Box<dyn AccessPolicy>,
}

impl Default for RealEstateContract {
    fn default() -> Self {
        Self::new(ContractConfig::default())
    }
}

impl RealEstateContract {
    pub fn new(config: ContractConfig) -> Self {
        Self {
            config,
            access: Box::new(AllowAll),
        }
    }

    pub fn with_access_policy(config: ContractConfig, access: Box<dyn AccessPolicy>) -> Self {
        Self { config, access }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub(crate) fn authorize(
        &self,
        stub: &dyn LedgerStub,
        action: Action,
        subject: &str,
    ) -> Result<(), ContractError> {
        self.access.authorize(stub.creator(), action, subject)
    }

    /// Run one invocation, returning its JSON payload (empty for writes)
    pub fn invoke(
        &self,
        stub: &mut dyn LedgerStub,
        invocation: &Invocation,
    ) -> Result<Vec<u8>, ContractError> {
        match invocation {
            Invocation::RegisterProperty {
                id,
                address,
                owner,
                agent,
            } => self
                .register_property(stub, id, address, owner, agent)
                .map(|_| Vec::new()),
            Invocation::ListProperty { id } => self.list_property(stub, id).map(|_| Vec::new()),
            Invocation::ViewProperties => payload(&self.view_properties(stub)?),
            Invocation::PlaceBid {
                property_id,
                bid_id,
                amount,
                bidder,
                agent,
            } => self
                .place_bid(stub, property_id, bid_id, *amount, bidder, agent)
                .map(|_| Vec::new()),
            Invocation::RejectBid {
                property_id,
                bid_id,
            } => self
                .reject_bid(stub, property_id, bid_id)
                .map(|_| Vec::new()),
            Invocation::CounterBid {
                property_id,
                bid_id,
                amount,
            } => self
                .counter_bid(stub, property_id, bid_id, *amount)
                .map(|_| Vec::new()),
            Invocation::RequestRepresentation {
                id,
                client,
                agent,
                start_date,
                end_date,
            } => self
                .request_representation(stub, id, client, agent, start_date, end_date)
                .map(|_| Vec::new()),
            Invocation::DeclineRepresentation { id } => {
                self.decline_representation(stub, id).map(|_| Vec::new())
            }
            Invocation::AcceptRepresentation { id } => {
                self.accept_representation(stub, id).map(|_| Vec::new())
            }
            Invocation::GetRepresentation { id } => payload(&self.get_representation(stub, id)?),
            Invocation::ListRepresentations { username } => {
                payload(&self.list_representations(stub, username)?)
            }
        }
    }
}

fn payload<T: Serialize>(value: &T) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(value).map_err(|e| {
        ContractError::Ledger(crate::ledger::LedgerError::Encoding(e.to_string()))
    })
}
