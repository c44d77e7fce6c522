//! Document identifiers

use bson::oid::ObjectId;
use expunge_common::{ExpungeError, Result};
use std::fmt;
use std::str::FromStr;

/// Length of an ObjectId in its hex encoding
const OBJECT_ID_HEX_LENGTH: usize = 24;

/// Identifier of a single document, backed by a BSON ObjectId
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// Parses a 24 character hex string into an identifier
    ///
    /// Runs entirely locally, so malformed input never costs a round trip.
    ///
    /// # Errors
    /// Returns `ExpungeError::InvalidIdentifier` on wrong length or non-hex input.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() != OBJECT_ID_HEX_LENGTH {
            return Err(ExpungeError::InvalidIdentifier(format!(
                "'{}' must be {} hex characters, got {}",
                raw.escape_default(),
                OBJECT_ID_HEX_LENGTH,
                raw.len()
            )));
        }

        if let Some(c) = raw.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ExpungeError::InvalidIdentifier(format!(
                "'{}' contains non-hex character {:?}",
                raw.escape_default(),
                c
            )));
        }

        Ok(Self(ObjectId::parse_str(raw)?))
    }

    /// The underlying ObjectId
    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for DocumentId {
    type Err = ExpungeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}
