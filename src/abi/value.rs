//! Runtime representation of ABI values

use ethers_core::types::{Address, I256, U256};

use super::types::SolidityType;
use super::AbiError;
use crate::utils::crypto::decode_hex;

/// Parse a decimal or `0x` hex quantity into a `U256`
pub fn parse_quantity(s: &str) -> Result<U256, AbiError> {
    let s = s.trim();
    let invalid = |e: String| AbiError::InvalidValue(format!("invalid integer {s:?}: {e}"));
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => U256::from_str_radix(digits, 16).map_err(|e| invalid(e.to_string())),
        None => U256::from_dec_str(s).map_err(|e| invalid(e.to_string())),
    }
}

/// A decoded (or to-be-encoded) Solidity value
///
/// Fixed-point values travel as their raw scaled integer in `Uint`/`Int`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    Address(Address),
    Uint(U256),
    Int(I256),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Create a Uint value from a u64
    pub fn uint(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }

    /// Create an Int value from an i64
    pub fn int(value: i64) -> Self {
        let raw = if value >= 0 {
            U256::from(value as u64)
        } else {
            // two's complement: -n == !(n - 1)
            !U256::from((-(value + 1)) as u64)
        };
        AbiValue::Int(I256::from_raw(raw))
    }

    /// Create a Uint value from a decimal or `0x` hex string
    pub fn uint_from_str(s: &str) -> Result<Self, AbiError> {
        parse_quantity(s).map(AbiValue::Uint)
    }

    /// Create an Address value from a hex string
    pub fn address_from_str(s: &str) -> Result<Self, AbiError> {
        let bytes = decode_hex(s).map_err(|e| AbiError::InvalidValue(format!("invalid address {s:?}: {e}")))?;
        if bytes.len() != 20 {
            return Err(AbiError::InvalidValue(format!(
                "address must be 20 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(AbiValue::Address(Address::from_slice(&bytes)))
    }

    /// Create a Bytes value from a hex string
    pub fn bytes_from_hex(s: &str) -> Result<Self, AbiError> {
        let bytes = decode_hex(s).map_err(|e| AbiError::InvalidValue(format!("invalid hex {s:?}: {e}")))?;
        Ok(AbiValue::Bytes(bytes))
    }

    /// Short name of the value's kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Bool(_) => "bool",
            AbiValue::Address(_) => "address",
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    /// Whether this value can be encoded as `ty` (shape only, not range)
    pub fn matches(&self, ty: &SolidityType) -> bool {
        match (self, ty) {
            (AbiValue::Bool(_), SolidityType::Boolean)
            | (AbiValue::Address(_), SolidityType::Address)
            | (AbiValue::Bytes(_), SolidityType::Bytes)
            | (AbiValue::String(_), SolidityType::String) => true,
            (
                AbiValue::Uint(_),
                SolidityType::UnsignedInteger { .. } | SolidityType::UnsignedFixedPoint { .. },
            ) => true,
            (
                AbiValue::Int(_),
                SolidityType::SignedInteger { .. } | SolidityType::SignedFixedPoint { .. },
            ) => true,
            (AbiValue::FixedBytes(b), SolidityType::FixedSizeBytes { bytes }) => b.len() == *bytes,
            (AbiValue::Array(items), SolidityType::Array { element }) => {
                items.iter().all(|item| item.matches(element))
            }
            (AbiValue::Array(items), SolidityType::FixedSizeArray { element, length }) => {
                items.len() == *length && items.iter().all(|item| item.matches(element))
            }
            (AbiValue::Tuple(items), SolidityType::Struct(members)) => {
                items.len() == members.len()
                    && items.iter().zip(members).all(|(item, member)| item.matches(member))
            }
            _ => false,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<I256> for AbiValue {
    fn from(value: I256) -> Self {
        AbiValue::Int(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}
