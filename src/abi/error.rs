//! ABI codec errors

use ethers_core::types::U256;

use super::types::TypeError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("insufficient data: requested {requested} bytes, {remaining} remaining")]
    InsufficientData { requested: usize, remaining: usize },

    #[error("parameter {index} ({type_name}): offset {offset} exceeds maximum valid offset {max}")]
    OffsetOutOfBounds {
        index: usize,
        type_name: String,
        offset: U256,
        max: usize,
    },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid UTF-8 in string parameter")]
    InvalidUtf8,

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("{function} expects {expected} arguments, got {got}")]
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("value {value} does not fit in {type_name}")]
    Overflow { type_name: String, value: String },

    #[error("malformed signature {0:?}")]
    InvalidSignature(String),

    #[error("no function with selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("no event with topic 0x{}", hex::encode(.0))]
    UnknownTopic([u8; 32]),

    #[error("event {event} is missing topic {index}")]
    MissingTopic { event: String, index: usize },
}
