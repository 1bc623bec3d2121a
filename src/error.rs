//! Unified error types for evm-codec
//!
//! Each module has its own error enum; [`Error`] wraps them all so callers
//! can use one `Result` type and classify failures with [`Error::kind`].

use serde::{Deserialize, Serialize};

use crate::abi::{AbiError, TypeError};
use crate::rlp::RlpError;
use crate::signer::SignerError;

/// Main error type for all codec operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Rlp(#[from] RlpError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed type descriptor or signature
    Type,
    /// Read past the end of the input or an offset/length outside it
    Bounds,
    /// Value does not match the expected shape, range or canonical form
    Shape,
    /// Unknown selector or topic
    Lookup,
    /// Key, signature or recovery failure
    Crypto,
    /// Malformed hex input
    Hex,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Type(_) => ErrorKind::Type,
            Error::Abi(e) => abi_kind(e),
            Error::Rlp(e) => rlp_kind(e),
            Error::Signer(SignerError::Rlp(e)) => rlp_kind(e),
            Error::Signer(_) => ErrorKind::Crypto,
            Error::Hex(_) => ErrorKind::Hex,
        }
    }
}

fn abi_kind(e: &AbiError) -> ErrorKind {
    match e {
        AbiError::Type(_) | AbiError::InvalidSignature(_) => ErrorKind::Type,
        AbiError::InsufficientData { .. } | AbiError::OffsetOutOfBounds { .. } => ErrorKind::Bounds,
        AbiError::UnknownSelector(_) | AbiError::UnknownTopic(_) | AbiError::MissingTopic { .. } => {
            ErrorKind::Lookup
        }
        AbiError::InvalidValue(_)
        | AbiError::InvalidUtf8
        | AbiError::TypeMismatch { .. }
        | AbiError::ArgumentCount { .. }
        | AbiError::Overflow { .. } => ErrorKind::Shape,
    }
}

fn rlp_kind(e: &RlpError) -> ErrorKind {
    match e {
        RlpError::InputTooShort | RlpError::TrailingBytes(_) => ErrorKind::Bounds,
        _ => ErrorKind::Shape,
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;
