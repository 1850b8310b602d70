//! Unified error type for all vault operations.

use thiserror::Error;

/// Things that can go wrong when using the vault.
///
/// A failed operation never leaves a half-applied change behind: the store
/// is exactly as it was before the call.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Empty key, non-numeric operand, unknown math operator, empty backup
    /// name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The operation needs an existing key and it is absent.
    #[error("key not found: '{0}'")]
    NotFound(String),
    /// The stored value has the wrong shape (e.g. push onto a non-array).
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// `/` or `%` with a zero operand.
    #[error("division by zero")]
    DivisionByZero,
    /// The stored value can't take part in arithmetic, or the result can't be
    /// represented in JSON.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// File system problem (mkdir, read, write, rename).
    #[error("i/o error: {0}")]
    Io(String),
    /// Failed to serialize the store to bytes.
    #[error("serialization error: {0}")]
    Serialize(String),
    /// Bad builder configuration (empty file name, zero backup interval).
    #[error("config error: {0}")]
    Config(String),
    /// An operation inside a transaction failed; nothing from the batch was
    /// applied.
    #[error("transaction failed at operation {index}: {source}")]
    TransactionFailed {
        /// Position of the failing operation in the batch.
        index: usize,
        /// What went wrong with it.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand for the empty-key check every keyed operation does.
    pub(crate) fn empty_key() -> Self {
        Error::InvalidArgument("key must be a non-empty string".into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
