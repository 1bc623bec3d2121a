//! ABI (Application Binary Interface) module for Solidity/EVM contracts
//!
//! This module provides the calldata codec:
//! - Solidity type descriptors (uint, int, fixed, address, bool, bytes, string, arrays, tuples)
//! - Function call encoding and decoding
//! - Return data and event log decoding
//! - Function selector and event topic calculation

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod function;
pub mod registry;
pub mod selector;
pub mod types;
pub mod value;


pub use decoder::{decode_call, decode_log, decode_values, Decoder};
pub use encoder::{encode_call, encode_values, Encoder};
pub use error::AbiError;
pub use function::{FunctionDef, LogEvent, LogEventDef, MethodCall, Param};
pub use registry::{AbiLookup, AbiRegistry};
pub use selector::{selector, topic, KnownSelectors, KnownTopics};
pub use types::{SolidityType, TypeError};
pub use value::{parse_quantity, AbiValue};
