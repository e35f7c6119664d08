// Invocation - entry point name plus string arguments, parsed into a typed call

use crate::contract::ContractError;

/// Entry points, in the order they are documented
pub const FUNCTIONS: &[&str] = &[
    "RegisterProperty",
    "ListProperty",
    "ViewProperties",
    "PlaceBid",
    "RejectBid",
    "CounterBid",
    "RequestRepresentation",
    "DeclineRepresentation",
    "AcceptRepresentation",
    "GetRepresentation",
    "ListRepresentations",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    RegisterProperty {
        id: String,
        address: String,
        owner: String,
        agent: String,
    },
    ListProperty {
        id: String,
    },
    ViewProperties,
    PlaceBid {
        property_id: String,
        bid_id: String,
        amount: i64,
        bidder: String,
        agent: String,
    },
    RejectBid {
        property_id: String,
        bid_id: String,
    },
    CounterBid {
        property_id: String,
        bid_id: String,
        amount: i64,
    },
    RequestRepresentation {
        id: String,
        client: String,
        agent: String,
        start_date: String,
        end_date: String,
    },
    DeclineRepresentation {
        id: String,
    },
    AcceptRepresentation {
        id: String,
    },
    GetRepresentation {
        id: String,
    },
    ListRepresentations {
        username: String,
    },
}

fn expect_args<'a>(
    function: &str,
    args: &'a [String],
    expected: usize,
) -> Result<&'a [String], ContractError> {
    if args.len() != expected {
        return Err(ContractError::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            function,
            expected,
            args.len()
        )));
    }
    Ok(args)
}

fn parse_amount(raw: &str) -> Result<i64, ContractError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| ContractError::InvalidArgument(format!("amount {:?}: {}", raw, e)))
}

impl Invocation {
    /// Parse a call by name. Names match case-insensitively, so both
    /// `PlaceBid` and `placeBid` resolve to the same entry point.
    pub fn parse(function: &str, args: &[String]) -> Result<Self, ContractError> {
        let canonical = FUNCTIONS
            .iter()
            .find(|name| name.eq_ignore_ascii_case(function))
            .ok_or_else(|| ContractError::UnknownFunction(function.to_string()))?;

        let invocation = match *canonical {
            "RegisterProperty" => {
                let a = expect_args(canonical, args, 4)?;
                Self::RegisterProperty {
                    id: a[0].clone(),
                    address: a[1].clone(),
                    owner: a[2].clone(),
                    agent: a[3].clone(),
                }
            }
            "ListProperty" => {
                let a = expect_args(canonical, args, 1)?;
                Self::ListProperty { id: a[0].clone() }
            }
            "ViewProperties" => {
                expect_args(canonical, args, 0)?;
                Self::ViewProperties
            }
            "PlaceBid" => {
                let a = expect_args(canonical, args, 5)?;
                Self::PlaceBid {
                    property_id: a[0].clone(),
                    bid_id: a[1].clone(),
                    amount: parse_amount(&a[2])?,
                    bidder: a[3].clone(),
                    agent: a[4].clone(),
                }
            }
            "RejectBid" => {
                let a = expect_args(canonical, args, 2)?;
                Self::RejectBid {
                    property_id: a[0].clone(),
                    bid_id: a[1].clone(),
                }
            }
            "CounterBid" => {
                let a = expect_args(canonical, args, 3)?;
                Self::CounterBid {
                    property_id: a[0].clone(),
                    bid_id: a[1].clone(),
                    amount: parse_amount(&a[2])?,
                }
            }
            "RequestRepresentation" => {
                let a = expect_args(canonical, args, 5)?;
                Self::RequestRepresentation {
                    id: a[0].clone(),
                    client: a[1].clone(),
                    agent: a[2].clone(),
                    start_date: a[3].clone(),
                    end_date: a[4].clone(),
                }
            }
            "DeclineRepresentation" => {
                let a = expect_args(canonical, args, 1)?;
                Self::DeclineRepresentation { id: a[0].clone() }
            }
            "AcceptRepresentation" => {
                let a = expect_args(canonical, args, 1)?;
                Self::AcceptRepresentation { id: a[0].clone() }
            }
            "GetRepresentation" => {
                let a = expect_args(canonical, args, 1)?;
                Self::GetRepresentation { id: a[0].clone() }
            }
            "ListRepresentations" => {
                let a = expect_args(canonical, args, 1)?;
                Self::ListRepresentations {
                    username: a[0].clone(),
                }
            }
            other => return Err(ContractError::UnknownFunction(other.to_string())),
        };

        Ok(invocation)
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::RegisterProperty { .. } => "RegisterProperty",
            Self::ListProperty { .. } => "ListProperty",
            Self::ViewProperties => "ViewProperties",
            Self::PlaceBid { .. } => "PlaceBid",
            Self::RejectBid { .. } => "RejectBid",
            Self::CounterBid { .. } => "CounterBid",
            Self::RequestRepresentation { .. } => "RequestRepresentation",
            Self::DeclineRepresentation { .. } => "DeclineRepresentation",
            Self::AcceptRepresentation { .. } => "AcceptRepresentation",
            Self::GetRepresentation { .. } => "GetRepresentation",
            Self::ListRepresentations { .. } => "ListRepresentations",
        }
    }

    /// Arguments in wire order, as they are signed into a proposal
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::RegisterProperty {
                id,
                address,
                owner,
                agent,
            } => vec![id.clone(), address.clone(), owner.clone(), agent.clone()],
            Self::ListProperty { id }
            | Self::DeclineRepresentation { id }
            | Self::AcceptRepresentation { id }
            | Self::GetRepresentation { id } => vec![id.clone()],
            Self::ViewProperties => Vec::new(),
            Self::PlaceBid {
                property_id,
                bid_id,
                amount,
                bidder,
                agent,
            } => vec![
                property_id.clone(),
                bid_id.clone(),
                amount.to_string(),
                bidder.clone(),
                agent.clone(),
            ],
            Self::RejectBid {
                property_id,
                bid_id,
            } => vec![property_id.clone(), bid_id.clone()],
            Self::CounterBid {
                property_id,
                bid_id,
                amount,
            } => vec![property_id.clone(), bid_id.clone(), amount.to_string()],
            Self::RequestRepresentation {
                id,
                client,
                agent,
                start_date,
                end_date,
            } => vec![
                id.clone(),
                client.clone(),
                agent.clone(),
                start_date.clone(),
                end_date.clone(),
            ],
            Self::ListRepresentations { username } => vec![username.clone()],
        }
    }

    /// Queries are evaluated without a commit
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::ViewProperties | Self::GetRepresentation { .. } | Self::ListRepresentations { .. }
        )
    }
}
