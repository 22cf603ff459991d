//! Entity ID - a ULID string issued by the server
//!
//! Structure of the 26 Crockford base32 characters:
//! - Characters 0-9:   Timestamp (milliseconds since Unix epoch, 48 bits)
//! - Characters 10-25: Randomness (80 bits)

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Crockford base32 alphabet used by ULIDs
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Server-issued entity identifier
///
/// Ids are kept as strings since the server is the only party that mints them;
/// the creation time is recoverable from the leading timestamp characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Number of leading characters that encode the timestamp
    pub const TIMESTAMP_LEN: usize = 10;

    /// Create an Id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id and return the inner string
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Extract the timestamp (milliseconds since Unix epoch)
    ///
    /// Returns `None` if the id is too short, contains characters outside the
    /// Crockford alphabet, or encodes a value wider than 48 bits.
    pub fn timestamp(&self) -> Option<u64> {
        let prefix = self.0.as_bytes().get(..Self::TIMESTAMP_LEN)?;

        let mut value: u64 = 0;
        for &byte in prefix {
            value = (value << 5) | u64::from(decode_char(byte)?);
        }

        (value < (1 << 48)).then_some(value)
    }

    /// Convert timestamp to DateTime<Utc>
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.timestamp()?).ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

fn decode_char(byte: u8) -> Option<u8> {
    let upper = match byte.to_ascii_uppercase() {
        b'O' => b'0',
        b'I' | b'L' => b'1',
        other => other,
    };
    ALPHABET
        .iter()
        .position(|&c| c == upper)
        .map(|index| index as u8)
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by `Id` be queried with `&str`
impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
