//! Solidity type descriptors
//!
//! Parses textual descriptors such as `uint256[3]` or `(address,bytes)` into
//! a classified [`SolidityType`].

use std::fmt;
use std::str::FromStr;

/// Largest integer/fixed-point width in bits
pub const MAX_BITS: usize = 256;
/// Largest `bytesN` width
pub const MAX_FIXED_BYTES: usize = 32;
/// Largest number of decimals for `fixed<M>x<N>`
pub const MAX_DECIMALS: usize = 80;

/// All supported Solidity types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolidityType {
    Boolean,
    Address,
    SignedInteger { bits: usize, bytes: usize },
    UnsignedInteger { bits: usize, bytes: usize },
    SignedFixedPoint { bits: usize, bytes: usize, decimals: usize },
    UnsignedFixedPoint { bits: usize, bytes: usize, decimals: usize },
    FixedSizeBytes { bytes: usize },
    Bytes,
    String,
    FixedSizeArray { element: Box<SolidityType>, length: usize },
    Array { element: Box<SolidityType> },
    /// Tuple; the bare `tuple` descriptor carries no member list
    Struct(Vec<SolidityType>),
}

/// Type descriptor errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid type {raw:?}: bit width {bits} must be a multiple of 8 in [8, 256]")]
    InvalidBitWidth { raw: String, bits: usize },

    #[error("invalid type {raw:?}: byte width {bytes} must be in [1, 32]")]
    InvalidByteWidth { raw: String, bytes: usize },

    #[error("invalid type {raw:?}: decimals {decimals} must be in [1, 80]")]
    InvalidDecimals { raw: String, decimals: usize },

    #[error("invalid type {raw:?}: array length {length:?} is not a positive integer")]
    InvalidArrayLength { raw: String, length: String },

    #[error("unknown type {raw:?}")]
    Unknown { raw: String },
}

impl SolidityType {
    /// Parse a type descriptor (case-insensitive)
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::parse_normalized(&normalized, raw)
    }

    fn parse_normalized(s: &str, raw: &str) -> Result<Self, TypeError> {
        match s {
            "bool" => return Ok(SolidityType::Boolean),
            "address" => return Ok(SolidityType::Address),
            "bytes" => return Ok(SolidityType::Bytes),
            "string" => return Ok(SolidityType::String),
            "tuple" => return Ok(SolidityType::Struct(vec![])),
            _ => {}
        }

        // Arrays bind loosest: `uint8[2][]` is an array of `uint8[2]`
        if let Some(inner) = s.strip_suffix("[]") {
            let element = Self::parse_normalized(inner, raw)?;
            return Ok(SolidityType::Array { element: Box::new(element) });
        }
        if s.ends_with(']') {
            if let Some(idx) = s.rfind('[') {
                let length_str = &s[idx + 1..s.len() - 1];
                let length = parse_number(length_str)
                    .filter(|&n| n > 0)
                    .ok_or_else(|| TypeError::InvalidArrayLength {
                        raw: raw.to_string(),
                        length: length_str.to_string(),
                    })?;
                let element = Self::parse_normalized(&s[..idx], raw)?;
                return Ok(SolidityType::FixedSizeArray { element: Box::new(element), length });
            }
        }

        if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            let members = split_tuple_members(inner)
                .into_iter()
                .map(|member| Self::parse_normalized(member, raw))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(SolidityType::Struct(members));
        }

        if let Some(width) = s.strip_prefix("bytes") {
            let bytes = parse_number(width).ok_or_else(|| unknown(raw))?;
            if bytes == 0 || bytes > MAX_FIXED_BYTES {
                return Err(TypeError::InvalidByteWidth { raw: raw.to_string(), bytes });
            }
            return Ok(SolidityType::FixedSizeBytes { bytes });
        }

        if let Some((signed, rest)) = strip_signedness(s, "fixed") {
            let (bits, decimals) = if rest.is_empty() {
                (128, 18)
            } else {
                let (bits_str, decimals_str) = rest.split_once('x').ok_or_else(|| unknown(raw))?;
                let bits = parse_number(bits_str).ok_or_else(|| unknown(raw))?;
                let decimals = parse_number(decimals_str).ok_or_else(|| unknown(raw))?;
                (bits, decimals)
            };
            let bits = check_bits(bits, raw)?;
            if decimals == 0 || decimals > MAX_DECIMALS {
                return Err(TypeError::InvalidDecimals { raw: raw.to_string(), decimals });
            }
            let bytes = bits / 8;
            return Ok(if signed {
                SolidityType::SignedFixedPoint { bits, bytes, decimals }
            } else {
                SolidityType::UnsignedFixedPoint { bits, bytes, decimals }
            });
        }

        if let Some((signed, rest)) = strip_signedness(s, "int") {
            let bits = if rest.is_empty() {
                MAX_BITS
            } else {
                parse_number(rest).ok_or_else(|| unknown(raw))?
            };
            let bits = check_bits(bits, raw)?;
            let bytes = bits / 8;
            return Ok(if signed {
                SolidityType::SignedInteger { bits, bytes }
            } else {
                SolidityType::UnsignedInteger { bits, bytes }
            });
        }

        Err(unknown(raw))
    }

    /// Whether the encoding has a variable length
    pub fn is_dynamic(&self) -> bool {
        match self {
            SolidityType::Bytes | SolidityType::String | SolidityType::Array { .. } => true,
            SolidityType::FixedSizeArray { element, .. } => element.is_dynamic(),
            SolidityType::Struct(members) => members.iter().any(|m| m.is_dynamic()),
            _ => false,
        }
    }

    /// Canonical form used when hashing signatures
    pub fn canonical(&self) -> String {
        match self {
            SolidityType::Boolean => "bool".to_string(),
            SolidityType::Address => "address".to_string(),
            SolidityType::SignedInteger { bits, .. } => format!("int{bits}"),
            SolidityType::UnsignedInteger { bits, .. } => format!("uint{bits}"),
            SolidityType::SignedFixedPoint { bits, decimals, .. } => format!("fixed{bits}x{decimals}"),
            SolidityType::UnsignedFixedPoint { bits, decimals, .. } => format!("ufixed{bits}x{decimals}"),
            SolidityType::FixedSizeBytes { bytes } => format!("bytes{bytes}"),
            SolidityType::Bytes => "bytes".to_string(),
            SolidityType::String => "string".to_string(),
            SolidityType::FixedSizeArray { element, length } => format!("{}[{}]", element.canonical(), length),
            SolidityType::Array { element } => format!("{}[]", element.canonical()),
            SolidityType::Struct(members) => {
                let inner = members.iter().map(|m| m.canonical()).collect::<Vec<_>>().join(",");
                format!("({inner})")
            }
        }
    }
}

impl fmt::Display for SolidityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for SolidityType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn unknown(raw: &str) -> TypeError {
    TypeError::Unknown { raw: raw.to_string() }
}

fn parse_number(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn check_bits(bits: usize, raw: &str) -> Result<usize, TypeError> {
    if bits < 8 || bits > MAX_BITS || bits % 8 != 0 {
        return Err(TypeError::InvalidBitWidth { raw: raw.to_string(), bits });
    }
    Ok(bits)
}

/// Split `uint...`/`int...` (or `ufixed`/`fixed`) into (signed, remainder)
fn strip_signedness<'a>(s: &'a str, base: &str) -> Option<(bool, &'a str)> {
    if let Some(rest) = s.strip_prefix('u').and_then(|r| r.strip_prefix(base)) {
        return Some((false, rest));
    }
    s.strip_prefix(base).map(|rest| (true, rest))
}

/// Split tuple members at top-level commas
fn split_tuple_members(s: &str) -> Vec<&str> {
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                members.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = s[start..].trim();
    if !last.is_empty() || !members.is_empty() {
        members.push(last);
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(bits: usize) -> SolidityType {
        SolidityType::UnsignedInteger { bits, bytes: bits / 8 }
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(SolidityType::parse("bool").unwrap(), SolidityType::Boolean);
        assert_eq!(SolidityType::parse("address").unwrap(), SolidityType::Address);
        assert_eq!(SolidityType::parse("bytes").unwrap(), SolidityType::Bytes);
        assert_eq!(SolidityType::parse("string").unwrap(), SolidityType::String);
        assert_eq!(SolidityType::parse("tuple").unwrap(), SolidityType::Struct(vec![]));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(SolidityType::parse("BOOL").unwrap(), SolidityType::Boolean);
        assert_eq!(SolidityType::parse("Uint256").unwrap(), uint(256));
        assert_eq!(SolidityType::parse(" Address ").unwrap(), SolidityType::Address);
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(SolidityType::parse("uint8").unwrap(), uint(8));
        assert_eq!(SolidityType::parse("uint").unwrap(), uint(256));
        assert_eq!(
            SolidityType::parse("int64").unwrap(),
            SolidityType::SignedInteger { bits: 64, bytes: 8 }
        );
        assert_eq!(
            SolidityType::parse("int").unwrap(),
            SolidityType::SignedInteger { bits: 256, bytes: 32 }
        );
    }

    #[test]
    fn test_parse_rejects_bad_bit_widths() {
        assert!(matches!(
            SolidityType::parse("uint7"),
            Err(TypeError::InvalidBitWidth { bits: 7, .. })
        ));
        assert!(matches!(
            SolidityType::parse("int264"),
            Err(TypeError::InvalidBitWidth { bits: 264, .. })
        ));
        assert!(matches!(
            SolidityType::parse("uint0"),
            Err(TypeError::InvalidBitWidth { bits: 0, .. })
        ));
    }

    #[test]
    fn test_parse_fixed_bytes() {
        assert_eq!(SolidityType::parse("bytes1").unwrap(), SolidityType::FixedSizeBytes { bytes: 1 });
        assert_eq!(SolidityType::parse("bytes32").unwrap(), SolidityType::FixedSizeBytes { bytes: 32 });

        let err = SolidityType::parse("bytes33").unwrap_err();
        assert_eq!(err, TypeError::InvalidByteWidth { raw: "bytes33".into(), bytes: 33 });
        assert!(err.to_string().contains("bytes33"));
        assert!(SolidityType::parse("bytes0").is_err());
    }

    #[test]
    fn test_parse_fixed_point() {
        assert_eq!(
            SolidityType::parse("fixed128x18").unwrap(),
            SolidityType::SignedFixedPoint { bits: 128, bytes: 16, decimals: 18 }
        );
        assert_eq!(
            SolidityType::parse("ufixed64x10").unwrap(),
            SolidityType::UnsignedFixedPoint { bits: 64, bytes: 8, decimals: 10 }
        );
        assert_eq!(
            SolidityType::parse("ufixed").unwrap(),
            SolidityType::UnsignedFixedPoint { bits: 128, bytes: 16, decimals: 18 }
        );
        assert!(matches!(
            SolidityType::parse("fixed12x4"),
            Err(TypeError::InvalidBitWidth { bits: 12, .. })
        ));
        assert!(matches!(
            SolidityType::parse("fixed128x81"),
            Err(TypeError::InvalidDecimals { decimals: 81, .. })
        ));
    }

    #[test]
    fn test_parse_arrays() {
        assert_eq!(
            SolidityType::parse("uint256[3]").unwrap(),
            SolidityType::FixedSizeArray { element: Box::new(uint(256)), length: 3 }
        );
        assert_eq!(
            SolidityType::parse("address[]").unwrap(),
            SolidityType::Array { element: Box::new(SolidityType::Address) }
        );
        assert_eq!(
            SolidityType::parse("uint8[2][]").unwrap(),
            SolidityType::Array {
                element: Box::new(SolidityType::FixedSizeArray { element: Box::new(uint(8)), length: 2 })
            }
        );
    }

    #[test]
    fn test_parse_array_errors_name_the_raw_descriptor() {
        let err = SolidityType::parse("uint256[x]").unwrap_err();
        assert!(matches!(err, TypeError::InvalidArrayLength { ref raw, .. } if raw == "uint256[x]"));
        assert!(SolidityType::parse("uint256[0]").is_err());
        assert!(matches!(
            SolidityType::parse("uint9[]"),
            Err(TypeError::InvalidBitWidth { ref raw, .. }) if raw == "uint9[]"
        ));
    }

    #[test]
    fn test_parse_tuples() {
        assert_eq!(
            SolidityType::parse("(uint256,address,bool)").unwrap(),
            SolidityType::Struct(vec![uint(256), SolidityType::Address, SolidityType::Boolean])
        );
        assert_eq!(
            SolidityType::parse("((uint8,bytes),string)").unwrap(),
            SolidityType::Struct(vec![
                SolidityType::Struct(vec![uint(8), SolidityType::Bytes]),
                SolidityType::String,
            ])
        );
        assert_eq!(SolidityType::parse("()").unwrap(), SolidityType::Struct(vec![]));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(SolidityType::parse("mapping").unwrap_err(), TypeError::Unknown { raw: "mapping".into() });
        assert!(SolidityType::parse("uintx").is_err());
        assert!(SolidityType::parse("").is_err());
    }

    #[test]
    fn test_is_dynamic() {
        assert!(!SolidityType::parse("uint256").unwrap().is_dynamic());
        assert!(!SolidityType::parse("address").unwrap().is_dynamic());
        assert!(!SolidityType::parse("bytes32").unwrap().is_dynamic());
        assert!(!SolidityType::parse("uint256[3]").unwrap().is_dynamic());
        assert!(!SolidityType::parse("(uint256,bool)").unwrap().is_dynamic());

        assert!(SolidityType::parse("bytes").unwrap().is_dynamic());
        assert!(SolidityType::parse("string").unwrap().is_dynamic());
        assert!(SolidityType::parse("uint256[]").unwrap().is_dynamic());
        assert!(SolidityType::parse("string[2]").unwrap().is_dynamic());
        assert!(SolidityType::parse("(uint256,bytes)").unwrap().is_dynamic());
    }

    #[test]
    fn test_huge_fixed_array() {
        let ty = SolidityType::parse("uint256[576460752303423488]").unwrap();
        assert!(!ty.is_dynamic());
        assert_eq!(ty.canonical(), "uint256[576460752303423488]");

        // decoding runs out of data instead of sizing the array up front
        let err = crate::abi::decode_values(&[ty], &[0u8; 64]).unwrap_err();
        assert!(matches!(err, crate::abi::AbiError::InsufficientData { .. }));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(SolidityType::parse("uint").unwrap().canonical(), "uint256");
        assert_eq!(SolidityType::parse("UINT8[2][]").unwrap().canonical(), "uint8[2][]");
        assert_eq!(SolidityType::parse("(uint256, bool)").unwrap().canonical(), "(uint256,bool)");
        assert_eq!(SolidityType::parse("fixed").unwrap().to_string(), "fixed128x18");
    }
}
