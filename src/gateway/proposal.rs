// Proposal - a signed request to run one entry point
//
// The proposing client fixes the transaction id and timestamp here, before
// any execution. Handlers read the timestamp from the resulting TxHeader,
// so re-executing the same proposal always yields the same documents.

use crate::contract::{ContractError, Invocation};
use crate::identity::{ClientIdentity, Signature, SigningIdentity};
use crate::ledger::{format_timestamp, TxHeader, TxId};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

const NONCE_LEN: usize = 24;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    tx_id: TxId,
    function: String,
    args: Vec<String>,
    timestamp: DateTime<Utc>,
    nonce: String,
    creator: ClientIdentity,
    signature: Signature,
}

impl Proposal {
    /// Create and sign a proposal stamped with the current time
    pub fn new(signer: &SigningIdentity, invocation: &Invocation) -> Self {
        Self::with_timestamp(signer, invocation, Utc::now())
    }

    /// Create and sign a proposal with an explicit timestamp
    pub fn with_timestamp(
        signer: &SigningIdentity,
        invocation: &Invocation,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let creator = signer.identity().clone();
        let tx_id = TxId::derive(&nonce, creator.public_key());
        let function = invocation.function_name().to_string();
        let args = invocation.args();
        let nonce = hex::encode(nonce);
        let signature = signer.sign(&signing_bytes(
            &tx_id, &function, &args, &timestamp, &nonce, &creator,
        ));

        Self {
            tx_id,
            function,
            args,
            timestamp,
            nonce,
            creator,
            signature,
        }
    }

    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn creator(&self) -> &ClientIdentity {
        &self.creator
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Deterministic byte layout covered by the signature
    pub fn signing_bytes(&self) -> Vec<u8> {
        signing_bytes(
            &self.tx_id,
            &self.function,
            &self.args,
            &self.timestamp,
            &self.nonce,
            &self.creator,
        )
    }

    /// Check the signature and that the tx id belongs to this nonce and creator
    pub fn verify(&self) -> bool {
        let Ok(nonce) = hex::decode(&self.nonce) else {
            return false;
        };
        if TxId::derive(&nonce, self.creator.public_key()) != self.tx_id {
            return false;
        }
        self.creator
            .public_key()
            .verify(&self.signing_bytes(), &self.signature)
    }

    pub fn invocation(&self) -> Result<Invocation, ContractError> {
        Invocation::parse(&self.function, &self.args)
    }

    /// Execution context handed to the transaction
    pub fn header(&self) -> TxHeader {
        TxHeader::new(self.tx_id.clone(), self.timestamp, self.creator.clone())
    }
}

fn signing_bytes(
    tx_id: &TxId,
    function: &str,
    args: &[String],
    timestamp: &DateTime<Utc>,
    nonce: &str,
    creator: &ClientIdentity,
) -> Vec<u8> {
    fn push(bytes: &mut Vec<u8>, field: &[u8]) {
        bytes.extend_from_slice(&(field.len() as u32).to_le_bytes());
        bytes.extend_from_slice(field);
    }

    let mut bytes = Vec::new();
    push(&mut bytes, tx_id.as_str().as_bytes());
    push(&mut bytes, function.as_bytes());
    bytes.extend_from_slice(&(args.len() as u32).to_le_bytes());
    for arg in args {
        push(&mut bytes, arg.as_bytes());
    }
    push(&mut bytes, format_timestamp(timestamp).as_bytes());
    push(&mut bytes, nonce.as_bytes());
    push(&mut bytes, creator.msp_id().as_bytes());
    push(&mut bytes, creator.name().as_bytes());
    push(&mut bytes, creator.public_key().as_bytes());
    bytes
}
