mod cbor;


use crate::error::InternalError;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use thiserror::Error as ThisError;

/// Record codec used for every primary-store payload.
///
/// This module is format-level only:
/// - Payload sizing policy lives in the constants below, not in callers.
/// - Decode failures are values, never panics.

/// Max serialized bytes for a single record to keep value loads bounded.
pub const MAX_RECORD_BYTES: usize = 4 * 1024 * 1024;

/// Payloads shorter than this are never a valid encoded record.
pub const MIN_RECORD_BYTES: usize = 2;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("payload too short to be an encoded record: {len} bytes")]
    Truncated { len: usize },

    #[error("payload size limit exceeded: {len} bytes (limit {MAX_RECORD_BYTES})")]
    TooLarge { len: usize },
}

///
/// SerializeErrorKind
///
/// Stable error-kind taxonomy for serializer failures.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SerializeErrorKind {
    Serialize,
    Deserialize,
    Truncated,
    TooLarge,
}

impl SerializeErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serialize => "serialize",
            Self::Deserialize => "deserialize",
            Self::Truncated => "truncated",
            Self::TooLarge => "too_large",
        }
    }
}

impl fmt::Display for SerializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SerializeError {
    /// Return a stable error kind independent of backend error-message text.
    #[must_use]
    pub const fn kind(&self) -> SerializeErrorKind {
        match self {
            Self::Serialize(_) => SerializeErrorKind::Serialize,
            Self::Deserialize(_) => SerializeErrorKind::Deserialize,
            Self::Truncated { .. } => SerializeErrorKind::Truncated,
            Self::TooLarge { .. } => SerializeErrorKind::TooLarge,
        }
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        match err.kind() {
            SerializeErrorKind::Serialize | SerializeErrorKind::TooLarge => {
                Self::serialize_unsupported(err.to_string())
            }
            SerializeErrorKind::Deserialize | SerializeErrorKind::Truncated => {
                Self::serialize_corruption(err.to_string())
            }
        }
    }
}

/// Encode a record into CBOR bytes.
pub fn serialize<T>(value: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    let bytes = cbor::serialize(value)?;
    if bytes.len() > MAX_RECORD_BYTES {
        return Err(SerializeError::TooLarge { len: bytes.len() });
    }

    Ok(bytes)
}

/// Decode a record produced by [`serialize`].
pub fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() < MIN_RECORD_BYTES {
        return Err(SerializeError::Truncated { len: bytes.len() });
    }

    cbor::deserialize(bytes)
}
