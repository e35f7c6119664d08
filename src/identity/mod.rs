// Identity module - Ed25519 signing keys and caller identities

mod client;
mod keys;

pub use client::{ClientIdentity, SigningIdentity, DEFAULT_MSP_ID};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
