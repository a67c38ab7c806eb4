
use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::index::IndexInfo,
};
use rand::{Rng, distributions::Alphanumeric};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Reserved byte between the field value and the record id.
/// Field values containing it are rejected at encode time.
pub const SEPARATOR: u8 = 0x00;

/// Delimiter between the index name (plus shard token) and the field value.
pub const NAME_DELIMITER: char = '-';

/// Delimiter between the index name and the shard token.
pub const SHARD_DELIMITER: char = '_';

/// Lookup value that lists every entry of an index.
pub const MATCH_ALL: &str = "*";

/// Primary-store key for a record id.
#[must_use]
pub fn primary_key(id: &str) -> &[u8] {
    id.as_bytes()
}

/// Fresh random shard token.
#[must_use]
pub fn shard_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

///
/// KeyError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("malformed index key: {reason}")]
    Malformed { reason: &'static str },

    #[error("value for index '{index}' contains the reserved separator byte")]
    ReservedByte { index: &'static str },
}

impl From<KeyError> for InternalError {
    fn from(err: KeyError) -> Self {
        let class = match err {
            KeyError::Malformed { .. } => ErrorClass::Corruption,
            KeyError::ReservedByte { .. } => ErrorClass::Unsupported,
        };

        Self::new(class, ErrorOrigin::Index, err.to_string())
    }
}

const fn malformed(reason: &'static str) -> KeyError {
    KeyError::Malformed { reason }
}

///
/// IndexKey
///
/// Decoded index-store key.
/// Layout: `<index>[_<shard>]-<value>\0<id>`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexKey {
    pub index: &'static str,
    pub shard: Option<String>,
    pub value: String,
    pub id: String,
}

impl IndexKey {
    /// Build the key written on insert; sharded indexes get a fresh token.
    pub fn build(
        info: &IndexInfo,
        value: &str,
        id: &str,
        shard_token_len: usize,
    ) -> Result<Vec<u8>, KeyError> {
        let shard = info.sharded.then(|| shard_token(shard_token_len));

        encode(info.name, shard.as_deref(), value, id)
    }

    /// Build the deterministic, token-free form of a key.
    ///
    /// This is the only form delete and update cleanup can reconstruct from a
    /// stored record; for sharded indexes it never matches a written entry.
    pub fn unsharded(info: &IndexInfo, value: &str, id: &str) -> Result<Vec<u8>, KeyError> {
        encode(info.name, None, value, id)
    }

    /// Parse a raw key read from the store of `info`'s index.
    pub fn parse(info: &IndexInfo, key: &[u8]) -> Result<Self, KeyError> {
        let text = std::str::from_utf8(key).map_err(|_| malformed("key is not utf-8"))?;
        let rest = text
            .strip_prefix(info.name)
            .ok_or(malformed("key does not start with the index name"))?;

        let (shard, rest) = if info.sharded {
            let rest = rest
                .strip_prefix(SHARD_DELIMITER)
                .ok_or(malformed("missing shard token"))?;
            let (token, rest) = rest
                .split_once(NAME_DELIMITER)
                .ok_or(malformed("missing name delimiter"))?;
            if token.is_empty() {
                return Err(malformed("empty shard token"));
            }

            (Some(token.to_string()), rest)
        } else {
            let rest = rest
                .strip_prefix(NAME_DELIMITER)
                .ok_or(malformed("missing name delimiter"))?;

            (None, rest)
        };

        let (value, id) = rest
            .split_once(char::from(SEPARATOR))
            .ok_or(malformed("missing value separator"))?;

        Ok(Self {
            index: info.name,
            shard,
            value: value.to_string(),
            id: id.to_string(),
        })
    }

    /// Re-encode this key.
    #[cfg(test)]
    pub fn to_bytes(&self) -> Result<Vec<u8>, KeyError> {
        encode(self.index, self.shard.as_deref(), &self.value, &self.id)
    }

    /// Lowest key prefix that covers every entry `lookup` can match.
    ///
    /// Sharded indexes always scan the whole index range because the token
    /// sits in front of the value.
    #[must_use]
    pub fn scan_prefix(info: &IndexInfo, lookup: IndexLookup<'_>) -> Vec<u8> {
        let mut prefix = info.name.as_bytes().to_vec();

        if info.sharded {
            push_char(&mut prefix, SHARD_DELIMITER);
            return prefix;
        }

        push_char(&mut prefix, NAME_DELIMITER);
        if let IndexLookup::Prefix(value) = lookup {
            prefix.extend_from_slice(value.as_bytes());
        }

        prefix
    }
}

///
/// IndexLookup
///
/// How a lookup value selects index entries.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexLookup<'a> {
    /// Every entry of the index (`*`).
    All,
    /// Entries whose field value is empty.
    Empty,
    /// Entries whose field value starts with the given text.
    Prefix(&'a str),
}

impl<'a> IndexLookup<'a> {
    #[must_use]
    pub fn from_value(value: &'a str) -> Self {
        match value {
            MATCH_ALL => Self::All,
            "" => Self::Empty,
            value => Self::Prefix(value),
        }
    }

    /// Whether a decoded entry value satisfies this lookup.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Empty => value.is_empty(),
            Self::Prefix(prefix) => value.starts_with(prefix),
        }
    }
}

fn encode(
    index: &'static str,
    shard: Option<&str>,
    value: &str,
    id: &str,
) -> Result<Vec<u8>, KeyError> {
    if value.as_bytes().contains(&SEPARATOR) {
        return Err(KeyError::ReservedByte { index });
    }

    let shard_len = shard.map_or(0, |token| token.len() + 1);
    let mut key = Vec::with_capacity(index.len() + shard_len + value.len() + id.len() + 2);
    key.extend_from_slice(index.as_bytes());
    if let Some(token) = shard {
        push_char(&mut key, SHARD_DELIMITER);
        key.extend_from_slice(token.as_bytes());
    }
    push_char(&mut key, NAME_DELIMITER);
    key.extend_from_slice(value.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(id.as_bytes());

    Ok(key)
}

fn push_char(buf: &mut Vec<u8>, c: char) {
    let mut tmp = [0u8; 4];
    buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
}
