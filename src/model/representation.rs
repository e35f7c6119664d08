// Representation agreements between a client and an agent

use crate::ledger::EntityKind;
use crate::model::{Entity, ModelError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepresentationStatus {
    Pending,
    Invited,
    Accepted,
    Declined,
}

impl RepresentationStatus {
    /// The strict transition table: only open requests can be decided
    pub fn can_transition_to(&self, next: RepresentationStatus) -> bool {
        use RepresentationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Declined) | (Invited, Accepted) | (Invited, Declined)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Invited => "invited",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for RepresentationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How accept/decline treat the current status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Accept and decline apply from any status
    #[default]
    Permissive,
    /// Only transitions allowed by `RepresentationStatus::can_transition_to`
    Strict,
}

impl TransitionPolicy {
    pub fn permits(&self, from: RepresentationStatus, to: RepresentationStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => from.can_transition_to(to),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representation {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "user_id")]
    client_username: String,
    #[serde(rename = "agent_id")]
    agent_username: String,
    start_date: String,
    end_date: String,
    status: RepresentationStatus,
    requested_at: String,
    #[serde(default)]
    signed_at: String,
    is_active: bool,
}

impl Representation {
    /// A new pending request stamped with the transaction time
    pub fn request(
        id: &str,
        client_username: &str,
        agent_username: &str,
        start_date: &str,
        end_date: &str,
        requested_at: String,
    ) -> Self {
        Self {
            id: id.to_string(),
            client_username: client_username.to_string(),
            agent_username: agent_username.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            status: RepresentationStatus::Pending,
            requested_at,
            signed_at: String::new(),
            is_active: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client_username(&self) -> &str {
        &self.client_username
    }

    pub fn agent_username(&self) -> &str {
        &self.agent_username
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    pub fn end_date(&self) -> &str {
        &self.end_date
    }

    pub fn status(&self) -> RepresentationStatus {
        self.status
    }

    pub fn requested_at(&self) -> &str {
        &self.requested_at
    }

    /// Empty until the agreement is accepted
    pub fn signed_at(&self) -> &str {
        &self.signed_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// True if `username` is either party
    pub fn involves(&self, username: &str) -> bool {
        self.client_username == username || self.agent_username == username
    }

    fn transition(
        &mut self,
        to: RepresentationStatus,
        policy: TransitionPolicy,
    ) -> Result<(), ModelError> {
        if !policy.permits(self.status, to) {
            return Err(ModelError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.is_active = to == RepresentationStatus::Accepted;
        Ok(())
    }

    pub fn accept(&mut self, signed_at: String, policy: TransitionPolicy) -> Result<(), ModelError> {
        self.transition(RepresentationStatus::Accepted, policy)?;
        self.signed_at = signed_at;
        Ok(())
    }

    pub fn decline(&mut self, policy: TransitionPolicy) -> Result<(), ModelError> {
        self.transition(RepresentationStatus::Declined, policy)
    }
}

impl Entity for Representation {
    const KIND: EntityKind = EntityKind::Representation;

    fn id(&self) -> &str {
        &self.id
    }

    fn check(&self) -> Result<(), ModelError> {
        if self.is_active != (self.status == RepresentationStatus::Accepted) {
            return Err(ModelError::Inconsistent(format!(
                "is_active={} with status {}",
                self.is_active, self.status
            )));
        }
        Ok(())
    }
}
