// Property handlers - register, list, view, and the bid lifecycle

use crate::contract::documents::{exists, load, save};
use crate::contract::query::scan_all;
use crate::contract::{Action, ContractError, RealEstateContract};
use crate::ledger::LedgerStub;
use crate::model::{Bid, ModelError, Property};
use tracing::info;

fn bid_error(property_id: &str, err: ModelError) -> ContractError {
    match err {
        ModelError::BidExists(id) => ContractError::AlreadyExists { kind: "bid", id },
        ModelError::BidNotFound(id) => ContractError::NotFound { kind: "bid", id },
        other => ContractError::InvalidArgument(format!("property {}: {}", property_id, other)),
    }
}

impl RealEstateContract {
    pub fn register_property(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        address: &str,
        owner: &str,
        agent: &str,
    ) -> Result<(), ContractError> {
        self.authorize(stub, Action::RegisterProperty, id)?;

        if exists::<Property>(stub, id)? {
            return Err(ContractError::AlreadyExists {
                kind: "property",
                id: id.to_string(),
            });
        }

        save(stub, &Property::new(id, address, owner, agent))?;
        info!(tx_id = %stub.tx_id(), property = id, owner, "property registered");
        Ok(())
    }

    pub fn list_property(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<(), ContractError> {
        self.authorize(stub, Action::ListProperty, id)?;

        let mut property: Property = load(stub, id)?;
        property.list();
        save(stub, &property)?;
        info!(tx_id = %stub.tx_id(), property = id, "property listed");
        Ok(())
    }

    pub fn view_properties(&self, stub: &mut dyn LedgerStub) -> Result<Vec<Property>, ContractError> {
        scan_all(stub)
    }

    pub fn place_bid(
        &self,
        stub: &mut dyn LedgerStub,
        property_id: &str,
        bid_id: &str,
        amount: i64,
        bidder: &str,
        agent: &str,
    ) -> Result<(), ContractError> {
        self.authorize(stub, Action::PlaceBid, property_id)?;

        let mut property: Property = load(stub, property_id)?;
        property
            .place_bid(Bid::new(bid_id, amount, bidder, agent))
            .map_err(|e| bid_error(property_id, e))?;
        save(stub, &property)?;
        info!(
            tx_id = %stub.tx_id(),
            property = property_id,
            bid = bid_id,
            amount,
            "bid placed"
        );
        Ok(())
    }

    pub fn reject_bid(
        &self,
        stub: &mut dyn LedgerStub,
        property_id: &str,
        bid_id: &str,
    ) -> Result<(), ContractError> {
        self.authorize(stub, Action::RejectBid, property_id)?;

        let mut property: Property = load(stub, property_id)?;
        property
            .reject_bid(bid_id)
            .map_err(|e| bid_error(property_id, e))?;
        save(stub, &property)?;
        info!(tx_id = %stub.tx_id(), property = property_id, bid = bid_id, "bid rejected");
        Ok(())
    }

    pub fn counter_bid(
        &self,
        stub: &mut dyn LedgerStub,
        property_id: &str,
        bid_id: &str,
        amount: i64,
    ) -> Result<(), ContractError> {
        self.authorize(stub, Action::CounterBid, property_id)?;

        let mut property: Property = load(stub, property_id)?;
        property
            .counter_bid(bid_id, amount)
            .map_err(|e| bid_error(property_id, e))?;
        save(stub, &property)?;
        info!(
            tx_id = %stub.tx_id(),
            property = property_id,
            bid = bid_id,
            amount,
            "bid countered"
        );
        Ok(())
    }
}
