// Range queries - scan one entity namespace, decode, filter, collect

use crate::contract::documents::decode;
use crate::contract::ContractError;
use crate::ledger::LedgerStub;
use crate::model::Entity;
use tracing::debug;

/// Every record of kind `E`, in key order
pub fn scan_all<E: Entity>(stub: &mut dyn LedgerStub) -> Result<Vec<E>, ContractError> {
    scan_filtered(stub, |_: &E| true)
}

/// Records of kind `E` for which `keep` returns true, in key order
///
/// A document that fails to decode aborts the whole scan with Malformed.
pub fn scan_filtered<E, F>(stub: &mut dyn LedgerStub, keep: F) -> Result<Vec<E>, ContractError>
where
    E: Entity,
    F: Fn(&E) -> bool,
{
    let (low, high) = E::KIND.range();
    let iter = stub.range_scan(&low, &high)?;
    let scanned = iter.remaining();

    let mut results = Vec::new();
    for (key, document) in iter {
        let entity: E = decode(&key, &document)?;
        if keep(&entity) {
            results.push(entity);
        }
    }

    debug!(kind = %E::KIND, scanned, matched = results.len(), "scan");
    Ok(results)
}
