// Representation Contract Tests
// Tests for requesting, accepting, declining and querying agreements

use chrono::{DateTime, TimeZone, Utc};
use estate_ledger::contract::{ContractConfig, ContractError, ErrorKind, RealEstateContract};
use estate_ledger::identity::SigningIdentity;
use estate_ledger::ledger::{
    LedgerStub, MemoryWorldState, TxContext, TxHeader, TxId, VersionedValue, WorldState,
};
use estate_ledger::model::{Representation, RepresentationStatus, TransitionPolicy};
use std::cell::Cell;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const BASE_SECS: i64 = 1_717_243_200;

fn at(offset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_SECS + offset, 123_456_789).unwrap()
}

struct Harness {
    world: MemoryWorldState,
    contract: RealEstateContract,
    signer: SigningIdentity,
    seq: Cell<i64>,
}

impl Harness {
    fn new() -> Self {
        Self::with_policy(TransitionPolicy::Permissive)
    }

    fn with_policy(policy: TransitionPolicy) -> Self {
        Self {
            world: MemoryWorldState::new(),
            contract: RealEstateContract::new(
                ContractConfig::new().with_transition_policy(policy),
            ),
            signer: SigningIdentity::generate("org1MSP", "agent1"),
            seq: Cell::new(0),
        }
    }

    fn run<T, F>(&self, f: F) -> Result<T, ContractError>
    where
        F: FnOnce(&RealEstateContract, &mut dyn LedgerStub) -> Result<T, ContractError>,
    {
        let seq = self.seq.get() + 1;
        self.seq.set(seq);
        let header = TxHeader::new(
            TxId::from_string(&format!("tx-{}", seq)),
            at(seq),
            self.signer.identity().clone(),
        );
        let tx_id = header.tx_id.clone();

        let mut ctx = TxContext::new(&self.world, header);
        let out = f(&self.contract, &mut ctx)?;
        let rwset = ctx.into_rwset();
        if !rwset.is_read_only() {
            self.world.commit(&tx_id, &rwset)?;
        }
        Ok(out)
    }

    fn request(&self, id: &str, client: &str, agent: &str) {
        self.run(|c, stub| c.request_representation(stub, id, client, agent, "2024-06-01", "2025-06-01"))
            .unwrap();
    }

    fn get(&self, id: &str) -> Result<Representation, ContractError> {
        self.run(|c, stub| c.get_representation(stub, id))
    }

    fn list(&self, username: &str) -> Vec<Representation> {
        self.run(|c, stub| c.list_representations(stub, username))
            .unwrap()
    }

    fn snapshot(&self) -> Vec<(Vec<u8>, VersionedValue)> {
        self.world.scan(b"", b"").unwrap()
    }
}

// ============================================================================
// REQUEST
// ============================================================================

#[test]
fn test_request_creates_pending_record() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");

    let r = h.get("R1").unwrap();
    assert_eq!(r.id(), "R1");
    assert_eq!(r.client_username(), "alice");
    assert_eq!(r.agent_username(), "agent1");
    assert_eq!(r.start_date(), "2024-06-01");
    assert_eq!(r.end_date(), "2025-06-01");
    assert_eq!(r.status(), RepresentationStatus::Pending);
    assert!(!r.is_active());
    assert_eq!(r.signed_at(), "");
}

#[test]
fn test_requested_at_is_transaction_time() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");

    let r = h.get("R1").unwrap();
    assert_eq!(r.requested_at(), "2024-06-01T12:00:01.123456789Z");
    assert_eq!(
        DateTime::parse_from_rfc3339(r.requested_at()).unwrap(),
        at(1)
    );
}

#[test]
fn test_duplicate_request_rejected() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");
    let before = h.snapshot();

    let err = h
        .run(|c, stub| c.request_representation(stub, "R1", "eve", "agent9", "a", "b"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(h.snapshot(), before);
}

#[test]
fn test_document_field_names() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");

    let json = serde_json::to_value(h.get("R1").unwrap()).unwrap();
    assert_eq!(json["user_id"], "alice");
    assert_eq!(json["agent_id"], "agent1");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["is_active"], false);
}

// ============================================================================
// ACCEPT AND DECLINE
// ============================================================================

#[test]
fn test_accept_activates_and_signs() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");
    let requested_at = h.get("R1").unwrap().requested_at().to_string();

    h.run(|c, stub| c.accept_representation(stub, "R1")).unwrap();

    let r = h.get("R1").unwrap();
    assert_eq!(r.status(), RepresentationStatus::Accepted);
    assert!(r.is_active());
    assert_eq!(r.signed_at(), "2024-06-01T12:00:03.123456789Z");
    assert_eq!(r.requested_at(), requested_at);
}

#[test]
fn test_decline_deactivates() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");

    h.run(|c, stub| c.decline_representation(stub, "R1")).unwrap();

    let r = h.get("R1").unwrap();
    assert_eq!(r.status(), RepresentationStatus::Declined);
    assert!(!r.is_active());
    assert_eq!(r.signed_at(), "");
}

#[test]
fn test_decline_missing_leaves_ledger_untouched() {
    let h = Harness::new();

    let err = h
        .run(|c, stub| c.decline_representation(stub, "R9"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(h.world.is_empty().unwrap());
    assert!(h.list("alice").is_empty());
}

#[test]
fn test_accept_missing() {
    let h = Harness::new();
    let err = h
        .run(|c, stub| c.accept_representation(stub, "R9"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_permissive_policy_allows_redeciding() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");

    h.run(|c, stub| c.decline_representation(stub, "R1")).unwrap();
    h.run(|c, stub| c.accept_representation(stub, "R1")).unwrap();

    let r = h.get("R1").unwrap();
    assert_eq!(r.status(), RepresentationStatus::Accepted);
    assert!(r.is_active());
}

#[test]
fn test_strict_policy_rejects_redeciding() {
    let h = Harness::with_policy(TransitionPolicy::Strict);
    h.request("R1", "alice", "agent1");
    h.run(|c, stub| c.accept_representation(stub, "R1")).unwrap();
    let before = h.snapshot();

    let err = h
        .run(|c, stub| c.decline_representation(stub, "R1"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(
        err.to_string(),
        "representation R1 cannot move from accepted to declined"
    );
    assert_eq!(h.snapshot(), before);
    assert!(h.get("R1").unwrap().is_active());
}

#[test]
fn test_strict_policy_allows_pending_decisions() {
    let h = Harness::with_policy(TransitionPolicy::Strict);
    h.request("R1", "alice", "agent1");
    h.request("R2", "alice", "agent1");

    h.run(|c, stub| c.accept_representation(stub, "R1")).unwrap();
    h.run(|c, stub| c.decline_representation(stub, "R2")).unwrap();

    assert_eq!(h.get("R1").unwrap().status(), RepresentationStatus::Accepted);
    assert_eq!(h.get("R2").unwrap().status(), RepresentationStatus::Declined);
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_get_missing() {
    let h = Harness::new();
    let err = h.get("R1").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "the representation R1 does not exist");
}

#[test]
fn test_list_matches_client_or_agent() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");
    h.request("R2", "bob", "alice");
    h.request("R3", "carol", "agent2");

    let ids: Vec<String> = h.list("alice").iter().map(|r| r.id().to_string()).collect();
    assert_eq!(ids, vec!["R1", "R2"]);

    let ids: Vec<String> = h.list("agent2").iter().map(|r| r.id().to_string()).collect();
    assert_eq!(ids, vec!["R3"]);

    assert!(h.list("nobody").is_empty());
}

#[test]
fn test_list_ignores_properties() {
    let h = Harness::new();
    h.run(|c, stub| c.register_property(stub, "P1", "1 Main St", "alice", "agent1"))
        .unwrap();
    h.request("R1", "alice", "agent1");

    let listed = h.list("alice");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), "R1");
}

#[test]
fn test_list_reports_current_status() {
    let h = Harness::new();
    h.request("R1", "alice", "agent1");
    h.request("R2", "alice", "agent1");
    h.run(|c, stub| c.accept_representation(stub, "R2")).unwrap();

    let listed = h.list("agent1");
    assert_eq!(listed[0].status(), RepresentationStatus::Pending);
    assert_eq!(listed[1].status(), RepresentationStatus::Accepted);
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn test_replay_produces_identical_state() {
    let first = Harness::new();
    let second = Harness::new();

    for h in [&first, &second] {
        h.request("R1", "alice", "agent1");
        h.run(|c, stub| c.accept_representation(stub, "R1")).unwrap();
    }

    assert_eq!(first.snapshot(), second.snapshot());
}
