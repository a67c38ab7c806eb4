use crate::serialize::{MAX_RECORD_BYTES, SerializeError};
use serde::{Serialize, de::DeserializeOwned};
use serde_cbor::{from_slice, to_vec};

/// Serialize a value into CBOR bytes.
pub(super) fn serialize<T>(t: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    to_vec(t).map_err(|e| SerializeError::Serialize(e.to_string()))
}

/// Deserialize CBOR bytes into a value.
///
/// Input size is bounded before decode; every decode failure comes back as
/// `SerializeError::Deserialize`.
pub(super) fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > MAX_RECORD_BYTES {
        return Err(SerializeError::TooLarge { len: bytes.len() });
    }

    from_slice(bytes).map_err(|err| SerializeError::Deserialize(err.to_string()))
}
