// Contract client - the call surface applications program against

use crate::gateway::{Gateway, GatewayError};
use async_trait::async_trait;

/// Invoke entry points by name with string arguments
///
/// `Gateway` is the in-process implementation; a networked client would
/// implement the same trait.
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Run a query; nothing is committed
    async fn evaluate_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError>;

    /// Run and commit a transaction, returning its payload once committed
    async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError>;
}

#[async_trait]
impl ContractClient for Gateway {
    async fn evaluate_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        self.evaluate(function, args)
    }

    async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        Ok(self.submit(function, args).await?.payload)
    }
}
