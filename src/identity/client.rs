// Client identity - who is calling the ledger, and how their proposals are signed

use crate::identity::{KeyError, Keypair, PublicKey, Signature};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Default membership service provider for locally created identities
pub const DEFAULT_MSP_ID: &str = "org1MSP";

/// The calling identity as seen by contract handlers
///
/// Handlers receive this through `LedgerStub::creator()`. No authorization
/// rule is attached to it here; see `contract::AccessPolicy`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    msp_id: String,
    name: String,
    public_key: PublicKey,
}

impl ClientIdentity {
    pub fn new(msp_id: &str, name: &str, public_key: PublicKey) -> Self {
        Self {
            msp_id: msp_id.to_string(),
            name: name.to_string(),
            public_key,
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// The username this identity acts as
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Stable fingerprint: hex(sha256(msp_id ":" public key))
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.msp_id.as_bytes());
        hasher.update(b":");
        hasher.update(self.public_key.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.msp_id)
    }
}

/// A client identity together with the key that signs on its behalf
#[derive(Clone, Debug)]
pub struct SigningIdentity {
    identity: ClientIdentity,
    keypair: Keypair,
}

impl SigningIdentity {
    pub fn new(msp_id: &str, name: &str, keypair: Keypair) -> Self {
        let identity = ClientIdentity::new(msp_id, name, keypair.public_key());
        Self { identity, keypair }
    }

    /// Create an identity with a freshly generated key
    pub fn generate(msp_id: &str, name: &str) -> Self {
        Self::new(msp_id, name, Keypair::generate())
    }

    /// Restore an identity from persisted secret key bytes
    pub fn from_secret_bytes(msp_id: &str, name: &str, bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::new(msp_id, name, Keypair::from_bytes(bytes)?))
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.keypair.sign(message)
    }
}
