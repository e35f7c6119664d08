// Representation handlers - request, decide, and query agreements

use crate::contract::documents::{exists, load, save};
use crate::contract::query::scan_filtered;
use crate::contract::{Action, ContractError, RealEstateContract};
use crate::ledger::{format_timestamp, LedgerStub};
use crate::model::{ModelError, Representation};
use tracing::info;

fn transition_error(id: &str, err: ModelError) -> ContractError {
    match err {
        ModelError::InvalidTransition { from, to } => ContractError::InvalidTransition {
            id: id.to_string(),
            from,
            to,
        },
        other => ContractError::InvalidArgument(format!("representation {}: {}", id, other)),
    }
}

impl RealEstateContract {
    pub fn request_representation(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        client: &str,
        agent: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<(), ContractError> {
        self.authorize(stub, Action::RequestRepresentation, id)?;

        if exists::<Representation>(stub, id)? {
            return Err(ContractError::AlreadyExists {
                kind: "representation",
                id: id.to_string(),
            });
        }

        let requested_at = format_timestamp(&stub.tx_timestamp());
        let representation =
            Representation::request(id, client, agent, start_date, end_date, requested_at);
        save(stub, &representation)?;
        info!(
            tx_id = %stub.tx_id(),
            representation = id,
            client,
            agent,
            "representation requested"
        );
        Ok(())
    }

    pub fn decline_representation(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<(), ContractError> {
        self.authorize(stub, Action::DeclineRepresentation, id)?;

        let mut representation: Representation = load(stub, id)?;
        representation
            .decline(self.config().transition_policy)
            .map_err(|e| transition_error(id, e))?;
        save(stub, &representation)?;
        info!(tx_id = %stub.tx_id(), representation = id, "representation declined");
        Ok(())
    }

    pub fn accept_representation(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<(), ContractError> {
        self.authorize(stub, Action::AcceptRepresentation, id)?;

        let mut representation: Representation = load(stub, id)?;
        let signed_at = format_timestamp(&stub.tx_timestamp());
        representation
            .accept(signed_at, self.config().transition_policy)
            .map_err(|e| transition_error(id, e))?;
        save(stub, &representation)?;
        info!(tx_id = %stub.tx_id(), representation = id, "representation accepted");
        Ok(())
    }

    pub fn get_representation(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<Representation, ContractError> {
        load(stub, id)
    }

    /// Agreements where `username` is the client or the agent
    pub fn list_representations(
        &self,
        stub: &mut dyn LedgerStub,
        username: &str,
    ) -> Result<Vec<Representation>, ContractError> {
        scan_filtered(stub, |r: &Representation| r.involves(username))
    }
}
