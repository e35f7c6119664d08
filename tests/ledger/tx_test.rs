// Transaction Context Tests
// Tests for per-transaction reads, writes, scans and optimistic commit

use chrono::{TimeZone, Utc};
use estate_ledger::identity::SigningIdentity;
use estate_ledger::ledger::{
    LedgerError, LedgerStub, MemoryWorldState, TxContext, TxHeader, TxId, WorldState,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn header(tx: &str) -> TxHeader {
    let signer = SigningIdentity::generate("org1MSP", "tester");
    TxHeader::new(
        TxId::from_string(tx),
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        signer.identity().clone(),
    )
}

fn seed(world: &MemoryWorldState, entries: &[(&str, &str)]) {
    let mut ctx = TxContext::new(world, header("seed"));
    for (key, value) in entries {
        ctx.put(key.as_bytes(), value.as_bytes().to_vec()).unwrap();
    }
    let rwset = ctx.into_rwset();
    world.commit(&TxId::from_string("seed"), &rwset).unwrap();
}

fn commit(world: &MemoryWorldState, ctx: TxContext<'_>) -> Result<u64, LedgerError> {
    let tx_id = ctx.header().tx_id.clone();
    let rwset = ctx.into_rwset();
    world.commit(&tx_id, &rwset).map(|receipt| receipt.height)
}

// ============================================================================
// READS AND WRITES
// ============================================================================

#[test]
fn test_get_missing_key() {
    let world = MemoryWorldState::new();
    let mut ctx = TxContext::new(&world, header("t1"));

    assert_eq!(ctx.get(b"k").unwrap(), None);
    assert!(!ctx.exists(b"k").unwrap());
}

#[test]
fn test_put_visible_within_transaction_only() {
    let world = MemoryWorldState::new();
    let mut ctx = TxContext::new(&world, header("t1"));

    ctx.put(b"k", b"v1".to_vec()).unwrap();

    assert_eq!(ctx.get(b"k").unwrap(), Some(b"v1".to_vec()));
    assert!(ctx.exists(b"k").unwrap());
    assert_eq!(world.get(b"k").unwrap(), None);
}

#[test]
fn test_commit_assigns_height_as_version() {
    let world = MemoryWorldState::new();
    seed(&world, &[("a", "1")]);

    let mut ctx = TxContext::new(&world, header("t2"));
    ctx.put(b"b", b"2".to_vec()).unwrap();
    let height = commit(&world, ctx).unwrap();

    assert_eq!(height, 2);
    assert_eq!(world.height().unwrap(), 2);
    assert_eq!(world.get(b"a").unwrap().unwrap().version, 1);
    assert_eq!(world.get(b"b").unwrap().unwrap().version, 2);
}

#[test]
fn test_header_values_exposed_to_handlers() {
    let world = MemoryWorldState::new();
    let hdr = header("t-header");
    let ctx = TxContext::new(&world, hdr.clone());

    assert_eq!(ctx.tx_id(), &hdr.tx_id);
    assert_eq!(ctx.tx_timestamp(), hdr.timestamp);
    assert_eq!(ctx.creator().name(), "tester");
}

// ============================================================================
// OPTIMISTIC CONCURRENCY
// ============================================================================

#[test]
fn test_stale_read_aborts() {
    let world = MemoryWorldState::new();
    seed(&world, &[("k", "v0")]);

    let mut slow = TxContext::new(&world, header("slow"));
    slow.get(b"k").unwrap();
    slow.put(b"k", b"slow".to_vec()).unwrap();

    let mut fast = TxContext::new(&world, header("fast"));
    fast.get(b"k").unwrap();
    fast.put(b"k", b"fast".to_vec()).unwrap();

    commit(&world, fast).unwrap();
    let err = commit(&world, slow).unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(world.get(b"k").unwrap().unwrap().document, b"fast".to_vec());
}

#[test]
fn test_absent_read_then_created_aborts() {
    let world = MemoryWorldState::new();

    let mut first = TxContext::new(&world, header("first"));
    assert!(!first.exists(b"id").unwrap());
    first.put(b"id", b"first".to_vec()).unwrap();

    let mut second = TxContext::new(&world, header("second"));
    assert!(!second.exists(b"id").unwrap());
    second.put(b"id", b"second".to_vec()).unwrap();

    commit(&world, second).unwrap();
    assert!(commit(&world, first).unwrap_err().is_conflict());
}

#[test]
fn test_failed_commit_writes_nothing() {
    let world = MemoryWorldState::new();
    seed(&world, &[("k", "v0")]);

    let mut loser = TxContext::new(&world, header("loser"));
    loser.get(b"k").unwrap();
    loser.put(b"other", b"x".to_vec()).unwrap();

    seed(&world, &[("k", "v1")]);
    let before = world.height().unwrap();

    assert!(commit(&world, loser).is_err());
    assert_eq!(world.get(b"other").unwrap(), None);
    assert_eq!(world.height().unwrap(), before);
}

#[test]
fn test_blind_writes_do_not_conflict() {
    let world = MemoryWorldState::new();

    let mut a = TxContext::new(&world, header("a"));
    a.put(b"k", b"a".to_vec()).unwrap();
    let mut b = TxContext::new(&world, header("b"));
    b.put(b"k", b"b".to_vec()).unwrap();

    commit(&world, a).unwrap();
    commit(&world, b).unwrap();

    assert_eq!(world.get(b"k").unwrap().unwrap().document, b"b".to_vec());
}

// ============================================================================
// RANGE SCANS
// ============================================================================

#[test]
fn test_scan_is_ordered_and_half_open() {
    let world = MemoryWorldState::new();
    seed(&world, &[("c", "3"), ("a", "1"), ("b", "2"), ("d", "4")]);

    let mut ctx = TxContext::new(&world, header("scan"));
    let keys: Vec<Vec<u8>> = ctx.range_scan(b"a", b"d").unwrap().map(|(k, _)| k).collect();

    assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
}

#[test]
fn test_empty_bounds_scan_everything() {
    let world = MemoryWorldState::new();
    seed(&world, &[("x", "1"), ("\0y", "2"), ("zz", "3")]);

    let mut ctx = TxContext::new(&world, header("scan"));
    let iter = ctx.range_scan(b"", b"").unwrap();

    assert_eq!(iter.remaining(), 3);
}

#[test]
fn test_inverted_range_is_empty() {
    let world = MemoryWorldState::new();
    seed(&world, &[("a", "1")]);

    let mut ctx = TxContext::new(&world, header("scan"));
    assert!(!ctx.range_scan(b"z", b"a").unwrap().has_next());
}

#[test]
fn test_scan_sees_own_writes() {
    let world = MemoryWorldState::new();
    seed(&world, &[("a", "old")]);

    let mut ctx = TxContext::new(&world, header("scan"));
    ctx.put(b"a", b"new".to_vec()).unwrap();
    ctx.put(b"b", b"added".to_vec()).unwrap();
    let entries: Vec<(Vec<u8>, Vec<u8>)> = ctx.range_scan(b"", b"").unwrap().collect();

    assert_eq!(
        entries,
        vec![
            (b"a".to_vec(), b"new".to_vec()),
            (b"b".to_vec(), b"added".to_vec()),
        ]
    );
}

#[test]
fn test_phantom_insert_aborts_scanner() {
    let world = MemoryWorldState::new();
    seed(&world, &[("p1", "1")]);

    let mut scanner = TxContext::new(&world, header("scanner"));
    scanner.range_scan(b"p", b"q").unwrap().close();
    scanner.put(b"summary", b"1 entry".to_vec()).unwrap();

    seed(&world, &[("p2", "2")]);

    assert!(commit(&world, scanner).unwrap_err().is_conflict());
}

#[test]
fn test_insert_outside_scanned_range_is_fine() {
    let world = MemoryWorldState::new();
    seed(&world, &[("p1", "1")]);

    let mut scanner = TxContext::new(&world, header("scanner"));
    let _ = scanner.range_scan(b"p", b"q").unwrap();
    scanner.put(b"summary", b"1 entry".to_vec()).unwrap();

    seed(&world, &[("r1", "2")]);

    assert!(commit(&world, scanner).is_ok());
}
