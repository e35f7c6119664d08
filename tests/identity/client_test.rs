// Client Identity Tests
// Tests for caller identities and the keys that sign for them

use estate_ledger::identity::{
    ClientIdentity, KeyError, Keypair, PublicKey, Signature, SigningIdentity, DEFAULT_MSP_ID,
};

// ============================================================================
// CLIENT IDENTITY
// ============================================================================

#[test]
fn test_identity_display() {
    let signer = SigningIdentity::generate(DEFAULT_MSP_ID, "alice");

    assert_eq!(signer.identity().to_string(), "alice@org1MSP");
    assert_eq!(signer.identity().name(), "alice");
    assert_eq!(signer.identity().msp_id(), "org1MSP");
}

#[test]
fn test_fingerprint_is_stable_per_key_and_msp() {
    let keypair = Keypair::generate();
    let a = ClientIdentity::new("org1MSP", "alice", keypair.public_key());
    let renamed = ClientIdentity::new("org1MSP", "alice2", keypair.public_key());
    let other_msp = ClientIdentity::new("org2MSP", "alice", keypair.public_key());

    assert_eq!(a.fingerprint(), renamed.fingerprint());
    assert_ne!(a.fingerprint(), other_msp.fingerprint());
    assert_eq!(a.fingerprint().len(), 64);
}

#[test]
fn test_identity_json_carries_hex_key() {
    let signer = SigningIdentity::generate("org1MSP", "bob");
    let json = serde_json::to_value(signer.identity()).unwrap();

    assert_eq!(json["name"], "bob");
    assert_eq!(json["public_key"], signer.identity().public_key().to_hex());

    let back: ClientIdentity = serde_json::from_value(json).unwrap();
    assert_eq!(&back, signer.identity());
}

// ============================================================================
// SIGNING IDENTITY
// ============================================================================

#[test]
fn test_signature_verifies_against_identity_key() {
    let signer = SigningIdentity::generate("org1MSP", "alice");
    let signature = signer.sign(b"RegisterProperty");

    assert!(signer.identity().public_key().verify(b"RegisterProperty", &signature));
    assert!(!signer.identity().public_key().verify(b"ListProperty", &signature));
}

#[test]
fn test_restore_from_secret_bytes() {
    let original = SigningIdentity::generate("org1MSP", "alice");
    let secret = original.keypair().to_bytes();

    let restored = SigningIdentity::from_secret_bytes("org1MSP", "alice", &secret).unwrap();

    assert_eq!(restored.identity(), original.identity());
}

#[test]
fn test_restore_rejects_short_secret() {
    let err = SigningIdentity::from_secret_bytes("org1MSP", "alice", &[7u8; 16]).unwrap_err();
    assert!(matches!(err, KeyError::InvalidLength { expected: 32, got: 16 }));
}

// ============================================================================
// ENCODINGS
// ============================================================================

#[test]
fn test_public_key_hex() {
    let key = Keypair::generate().public_key();

    assert_eq!(PublicKey::from_hex(&key.to_hex()).unwrap(), key);
    assert!(PublicKey::from_hex("zz").is_err());
}

#[test]
fn test_signature_hex() {
    let signature = Keypair::generate().sign(b"msg");

    assert_eq!(Signature::from_hex(&signature.to_hex()).unwrap(), signature);
    assert!(Signature::from_bytes(&[0u8; 10]).is_err());
}
