// Composite keys - entity-type namespacing for the flat world-state keyspace
//
// Layout: 0x00 | type tag | 0x00 | id | 0x00
// The trailing separator keeps "P1" from prefixing "P10" inside a range.

use crate::ledger::LedgerError;
use std::fmt;

const SEPARATOR: u8 = 0x00;
/// Never produced by UTF-8, so it sorts after every id in a namespace
const RANGE_END: u8 = 0xFF;

/// The kinds of record that share the world state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Property,
    Representation,
}

impl EntityKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Representation => "representation",
        }
    }

    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"property" => Some(Self::Property),
            b"representation" => Some(Self::Representation),
            _ => None,
        }
    }

    /// Every key of this kind starts with these bytes
    pub fn prefix(&self) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(self.tag().len() + 2);
        prefix.push(SEPARATOR);
        prefix.extend_from_slice(self.tag().as_bytes());
        prefix.push(SEPARATOR);
        prefix
    }

    /// Half-open `[low, high)` range covering exactly this namespace
    pub fn range(&self) -> (Vec<u8>, Vec<u8>) {
        let low = self.prefix();
        let mut high = low.clone();
        high.push(RANGE_END);
        (low, high)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A world-state key made of an entity kind and an id
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey(Vec<u8>);

impl CompositeKey {
    /// Build the key for `id` in the `kind` namespace
    pub fn new(kind: EntityKind, id: &str) -> Result<Self, LedgerError> {
        if id.is_empty() {
            return Err(LedgerError::InvalidKey(format!("empty {} id", kind)));
        }
        if id.as_bytes().contains(&SEPARATOR) {
            return Err(LedgerError::InvalidKey(format!(
                "{} id {:?} contains a NUL byte",
                kind, id
            )));
        }

        let mut bytes = kind.prefix();
        bytes.extend_from_slice(id.as_bytes());
        bytes.push(SEPARATOR);
        Ok(Self(bytes))
    }

    /// Split raw key bytes back into kind and id
    pub fn parse(bytes: &[u8]) -> Option<(EntityKind, String)> {
        let rest = bytes.strip_prefix(&[SEPARATOR])?;
        let tag_end = rest.iter().position(|b| *b == SEPARATOR)?;
        let kind = EntityKind::from_tag(&rest[..tag_end])?;
        let id = rest[tag_end + 1..].strip_suffix(&[SEPARATOR])?;
        let id = std::str::from_utf8(id).ok()?;
        Some((kind, id.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for CompositeKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Printable form of a raw key for logs and error messages
pub fn display_key(bytes: &[u8]) -> String {
    match CompositeKey::parse(bytes) {
        Some((kind, id)) => format!("{}/{}", kind, id),
        None => String::from_utf8_lossy(bytes).replace('\0', "\\0"),
    }
}
