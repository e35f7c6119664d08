// Property and Bid records
//
// Bids live inside their property document. Every bid change rewrites the
// whole property, so concurrent bid activity on one property conflicts at
// commit and is serialized by resubmission.

use crate::ledger::EntityKind;
use crate::model::{Entity, ModelError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sale state of a property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyState {
    #[serde(rename = "Not for sale")]
    NotForSale,
    #[serde(rename = "Listed")]
    Listed,
}

/// An offer on a property
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Amount")]
    amount: i64,
    #[serde(rename = "Bidder")]
    bidder: String,
    #[serde(rename = "Agent")]
    agent: String,
    // Carried in the document; no operation sets them yet
    #[serde(rename = "BuyerCountered")]
    buyer_countered: bool,
    #[serde(rename = "SellerCountered")]
    seller_countered: bool,
}

impl Bid {
    pub fn new(id: &str, amount: i64, bidder: &str, agent: &str) -> Self {
        Self {
            id: id.to_string(),
            amount,
            bidder: bidder.to_string(),
            agent: agent.to_string(),
            buyer_countered: false,
            seller_countered: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn bidder(&self) -> &str {
        &self.bidder
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn buyer_countered(&self) -> bool {
        self.buyer_countered
    }

    pub fn seller_countered(&self) -> bool {
        self.seller_countered
    }
}

/// A registered property and the bids placed on it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Owner")]
    owner: String,
    #[serde(rename = "Agent")]
    agent: String,
    #[serde(rename = "State")]
    state: PropertyState,
    /// Sorted so every replica encodes the same bytes
    #[serde(rename = "Bids", default)]
    bids: BTreeMap<String, Bid>,
}

impl Property {
    /// A newly registered property: not for sale, no bids
    pub fn new(id: &str, address: &str, owner: &str, agent: &str) -> Self {
        Self {
            id: id.to_string(),
            address: address.to_string(),
            owner: owner.to_string(),
            agent: agent.to_string(),
            state: PropertyState::NotForSale,
            bids: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn state(&self) -> PropertyState {
        self.state
    }

    pub fn bids(&self) -> &BTreeMap<String, Bid> {
        &self.bids
    }

    pub fn bid(&self, bid_id: &str) -> Option<&Bid> {
        self.bids.get(bid_id)
    }

    /// Put the property on the market. Re-listing is a no-op.
    pub fn list(&mut self) {
        self.state = PropertyState::Listed;
    }

    pub fn place_bid(&mut self, bid: Bid) -> Result<(), ModelError> {
        if self.bids.contains_key(bid.id()) {
            return Err(ModelError::BidExists(bid.id().to_string()));
        }
        self.bids.insert(bid.id().to_string(), bid);
        Ok(())
    }

    /// Remove a bid, returning it
    pub fn reject_bid(&mut self, bid_id: &str) -> Result<Bid, ModelError> {
        self.bids
            .remove(bid_id)
            .ok_or_else(|| ModelError::BidNotFound(bid_id.to_string()))
    }

    /// Replace the amount of an existing bid; nothing else changes
    pub fn counter_bid(&mut self, bid_id: &str, amount: i64) -> Result<(), ModelError> {
        let bid = self
            .bids
            .get_mut(bid_id)
            .ok_or_else(|| ModelError::BidNotFound(bid_id.to_string()))?;
        bid.amount = amount;
        Ok(())
    }
}

impl Entity for Property {
    const KIND: EntityKind = EntityKind::Property;

    fn id(&self) -> &str {
        &self.id
    }

    fn check(&self) -> Result<(), ModelError> {
        for (key, bid) in &self.bids {
            if key != bid.id() {
                return Err(ModelError::Inconsistent(format!(
                    "bid stored under {:?} has id {:?}",
                    key,
                    bid.id()
                )));
            }
        }
        Ok(())
    }
}
