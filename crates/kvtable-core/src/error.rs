use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Table operations return this; subsystem errors convert into it via `From`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a store-origin I/O failure (backend write or read failed).
    pub(crate) fn store_io(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Io, ErrorOrigin::Store, message)
    }

    /// Construct the error returned by every operation on a closed store.
    pub(crate) fn store_closed(name: &str) -> Self {
        Self::new(
            ErrorClass::Closed,
            ErrorOrigin::Store,
            format!("store '{name}' is closed"),
        )
    }

    /// Construct an index-origin invariant violation.
    pub(crate) fn index_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Index, message)
    }

    /// Construct a serialize-origin corruption error.
    pub(crate) fn serialize_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Serialize, message)
    }

    /// Construct a serialize-origin unsupported error.
    pub(crate) fn serialize_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Serialize, message)
    }

    /// Construct a config-origin unsupported error.
    pub(crate) fn config_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, message)
    }

    /// Update (or any mutation requiring an existing row) targeted a missing id.
    pub fn not_found(table: &str, id: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Table,
            format!("record '{id}' does not exist in table '{table}'"),
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.class, ErrorClass::Closed)
    }

    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self.class, ErrorClass::Corruption)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    NotFound,
    Io,
    Closed,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::NotFound => "not_found",
            Self::Io => "io",
            Self::Closed => "closed",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Subsystem that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Serialize,
    Store,
    Index,
    Table,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Serialize => "serialize",
            Self::Store => "store",
            Self::Index => "index",
            Self::Table => "table",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_classified_for_update_callers() {
        let err = InternalError::not_found("users", "42");

        assert!(err.is_not_found());
        assert!(!err.is_closed());
        assert_eq!(err.origin, ErrorOrigin::Table);
        assert!(err.message.contains("'42'"));
    }

    #[test]
    fn display_with_class_prefixes_origin_and_class() {
        let err = InternalError::store_closed("users/primary");

        assert_eq!(
            err.display_with_class(),
            "store:closed: store 'users/primary' is closed"
        );
    }
}
