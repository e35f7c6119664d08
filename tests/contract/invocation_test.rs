// Invocation Tests
// Tests for resolving entry point names and arguments into typed calls

use estate_ledger::contract::{ContractError, ErrorKind, Invocation, FUNCTIONS};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// NAME RESOLUTION
// ============================================================================

#[test]
fn test_pascal_and_camel_case_resolve_alike() {
    let pascal = Invocation::parse("PlaceBid", &args(&["P1", "B1", "500000", "bob", "agent2"])).unwrap();
    let camel = Invocation::parse("placeBid", &args(&["P1", "B1", "500000", "bob", "agent2"])).unwrap();

    assert_eq!(pascal, camel);
    assert_eq!(
        pascal,
        Invocation::PlaceBid {
            property_id: "P1".into(),
            bid_id: "B1".into(),
            amount: 500000,
            bidder: "bob".into(),
            agent: "agent2".into(),
        }
    );
}

#[test]
fn test_every_documented_function_parses() {
    let arity = |name: &str| match name {
        "ViewProperties" => 0,
        "ListProperty" | "DeclineRepresentation" | "AcceptRepresentation"
        | "GetRepresentation" | "ListRepresentations" => 1,
        "RejectBid" => 2,
        "CounterBid" => 3,
        "RegisterProperty" => 4,
        _ => 5,
    };

    for name in FUNCTIONS {
        let call_args: Vec<String> = (0..arity(name)).map(|i| format!("{}", i + 1)).collect();
        let invocation = Invocation::parse(name, &call_args).unwrap();
        assert_eq!(invocation.function_name(), *name);
        assert_eq!(invocation.args(), call_args);
    }
}

#[test]
fn test_unknown_function() {
    let err = Invocation::parse("DeleteProperty", &[]).unwrap_err();

    assert!(matches!(err, ContractError::UnknownFunction(ref f) if f == "DeleteProperty"));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ============================================================================
// ARGUMENTS
// ============================================================================

#[test]
fn test_wrong_arity() {
    let err = Invocation::parse("RegisterProperty", &args(&["P1", "1 Main St"])).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(
        err.to_string(),
        "invalid argument: RegisterProperty expects 4 argument(s), got 2"
    );
}

#[test]
fn test_queries_take_no_extra_arguments() {
    assert!(Invocation::parse("ViewProperties", &args(&["extra"])).is_err());
}

#[test]
fn test_non_numeric_amount() {
    let err = Invocation::parse("CounterBid", &args(&["P1", "B1", "lots"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_amount_out_of_range() {
    let err = Invocation::parse(
        "PlaceBid",
        &args(&["P1", "B1", "99999999999999999999", "bob", "agent2"]),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_negative_amount_parses() {
    let invocation = Invocation::parse("CounterBid", &args(&["P1", "B1", "-10"])).unwrap();
    assert_eq!(
        invocation,
        Invocation::CounterBid {
            property_id: "P1".into(),
            bid_id: "B1".into(),
            amount: -10,
        }
    );
}

// ============================================================================
// READ-ONLY CLASSIFICATION
// ============================================================================

#[test]
fn test_read_only_entry_points() {
    assert!(Invocation::ViewProperties.is_read_only());
    assert!(Invocation::GetRepresentation { id: "R1".into() }.is_read_only());
    assert!(Invocation::ListRepresentations { username: "alice".into() }.is_read_only());

    assert!(!Invocation::ListProperty { id: "P1".into() }.is_read_only());
    assert!(!Invocation::AcceptRepresentation { id: "R1".into() }.is_read_only());
}
