// Typed load/save of entity documents through the ledger stub

use crate::contract::ContractError;
use crate::ledger::{display_key, CompositeKey, LedgerError, LedgerStub};
use crate::model::Entity;

pub(crate) fn key_of<E: Entity>(id: &str) -> Result<CompositeKey, ContractError> {
    CompositeKey::new(E::KIND, id).map_err(|e| ContractError::InvalidArgument(e.to_string()))
}

/// Decode a stored document, enforcing the entity's invariants
pub(crate) fn decode<E: Entity>(key: &[u8], document: &[u8]) -> Result<E, ContractError> {
    let malformed = |reason: String| ContractError::Malformed {
        kind: E::KIND.tag(),
        key: display_key(key),
        reason,
    };

    let entity: E = serde_json::from_slice(document).map_err(|e| malformed(e.to_string()))?;
    entity.check().map_err(|e| malformed(e.to_string()))?;
    Ok(entity)
}

pub(crate) fn encode<E: Entity>(entity: &E) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(entity)
        .map_err(|e| ContractError::Ledger(LedgerError::Encoding(e.to_string())))
}

pub(crate) fn exists<E: Entity>(stub: &mut dyn LedgerStub, id: &str) -> Result<bool, ContractError> {
    let key = key_of::<E>(id)?;
    Ok(stub.exists(key.as_bytes())?)
}

/// Read and decode `id`, failing with NotFound if absent
pub(crate) fn load<E: Entity>(stub: &mut dyn LedgerStub, id: &str) -> Result<E, ContractError> {
    let key = key_of::<E>(id)?;
    match stub.get(key.as_bytes())? {
        Some(document) => decode(key.as_bytes(), &document),
        None => Err(ContractError::NotFound {
            kind: E::KIND.tag(),
            id: id.to_string(),
        }),
    }
}

/// Write the whole document back under its key
pub(crate) fn save<E: Entity>(stub: &mut dyn LedgerStub, entity: &E) -> Result<(), ContractError> {
    let key = key_of::<E>(entity.id())?;
    stub.put(key.as_bytes(), encode(entity)?)?;
    Ok(())
}
