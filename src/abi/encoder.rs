//! ABI encoder for Solidity/EVM contracts
//!
//! Parameters are laid out head first: static values inline, dynamic values
//! as a 32-byte offset slot. Slots are reserved while the head is written and
//! back-filled once the payload position is known.

use ethers_core::types::{I256, U256};

use super::function::MethodCall;
use super::types::SolidityType;
use super::value::AbiValue;
use super::AbiError;
use crate::config::CodecConfig;
use crate::log_debug;

/// One 32-byte big-endian word
pub(crate) fn word(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Zero bytes needed to pad `len` to a multiple of 32
pub(crate) fn padding(len: usize) -> usize {
    (32 - len % 32) % 32
}

/// Whether a two's complement value fits in `bits` signed bits
pub(crate) fn int_fits(value: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let raw = value.into_raw();
    let magnitude = if value.is_negative() { !raw } else { raw };
    magnitude.bits() < bits
}

/// ABI encoder owning its output buffer
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
    config: CodecConfig,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Encoder {
            buf: Vec::new(),
            config,
        }
    }

    /// Write the selector followed by the call's arguments
    pub fn write_method(&mut self, call: &MethodCall<'_>) -> Result<(), AbiError> {
        let function = call.function;
        let selector = function.selector();
        self.buf.extend_from_slice(&selector);
        self.write_tuple(function.inputs().iter().map(|p| &p.kind), &call.args)?;

        log_debug!(
            &self.config,
            "abi::encoder",
            "encoded method call",
            function = function.signature(),
            selector = hex::encode(selector),
            size = self.buf.len(),
        );
        Ok(())
    }

    /// Write a bare parameter tuple (no selector)
    pub fn write_values(&mut self, types: &[SolidityType], values: &[AbiValue]) -> Result<(), AbiError> {
        self.write_tuple(types.iter(), values)
    }

    /// Encoded bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Encode a sequence of values. Offsets are relative to the first head
    /// slot of this sequence.
    fn write_tuple<'t, I>(&mut self, types: I, values: &[AbiValue]) -> Result<(), AbiError>
    where
        I: IntoIterator<Item = &'t SolidityType>,
    {
        let types: Vec<&SolidityType> = types.into_iter().collect();
        if types.len() != values.len() {
            return Err(AbiError::TypeMismatch {
                expected: format!("{} values", types.len()),
                got: format!("{} values", values.len()),
            });
        }

        let base = self.buf.len();
        let mut pending = Vec::new();

        for (ty, value) in types.into_iter().zip(values) {
            if ty.is_dynamic() {
                pending.push((self.buf.len(), ty, value));
                self.buf.extend_from_slice(&[0u8; 32]);
            } else {
                self.write_value(ty, value)?;
            }
        }

        for (slot, ty, value) in pending {
            let offset = word(U256::from(self.buf.len() - base));
            self.buf[slot..slot + 32].copy_from_slice(&offset);
            self.write_value(ty, value)?;
        }
        Ok(())
    }

    fn write_value(&mut self, ty: &SolidityType, value: &AbiValue) -> Result<(), AbiError> {
        match (ty, value) {
            (SolidityType::Boolean, AbiValue::Bool(b)) => {
                self.buf.extend_from_slice(&word(U256::from(*b as u8)));
            }
            (SolidityType::Address, AbiValue::Address(addr)) => {
                let mut out = [0u8; 32];
                out[12..].copy_from_slice(addr.as_bytes());
                self.buf.extend_from_slice(&out);
            }
            (
                SolidityType::UnsignedInteger { bits, .. } | SolidityType::UnsignedFixedPoint { bits, .. },
                AbiValue::Uint(v),
            ) => {
                if v.bits() > *bits {
                    return Err(overflow(ty, v));
                }
                self.buf.extend_from_slice(&word(*v));
            }
            (
                SolidityType::SignedInteger { bits, .. } | SolidityType::SignedFixedPoint { bits, .. },
                AbiValue::Int(v),
            ) => {
                if !int_fits(*v, *bits) {
                    return Err(overflow(ty, v));
                }
                self.buf.extend_from_slice(&word(v.into_raw()));
            }
            (SolidityType::FixedSizeBytes { bytes }, AbiValue::FixedBytes(data)) => {
                if data.len() != *bytes {
                    return Err(AbiError::InvalidValue(format!(
                        "{} expects {} bytes, got {}",
                        ty,
                        bytes,
                        data.len()
                    )));
                }
                let mut out = [0u8; 32];
                out[..data.len()].copy_from_slice(data);
                self.buf.extend_from_slice(&out);
            }
            (SolidityType::Bytes, AbiValue::Bytes(data)) => self.write_dynamic_bytes(data),
            (SolidityType::String, AbiValue::String(s)) => self.write_dynamic_bytes(s.as_bytes()),
            (SolidityType::Array { element }, AbiValue::Array(items)) => {
                self.buf.extend_from_slice(&word(U256::from(items.len())));
                self.write_tuple(std::iter::repeat(element.as_ref()).take(items.len()), items)?;
            }
            (SolidityType::FixedSizeArray { element, length }, AbiValue::Array(items)) => {
                if items.len() != *length {
                    return Err(AbiError::TypeMismatch {
                        expected: ty.canonical(),
                        got: format!("array of {} elements", items.len()),
                    });
                }
                self.write_tuple(std::iter::repeat(element.as_ref()).take(*length), items)?;
            }
            (SolidityType::Struct(members), AbiValue::Tuple(items)) => {
                self.write_tuple(members.iter(), items)?;
            }
            _ => {
                return Err(AbiError::TypeMismatch {
                    expected: ty.canonical(),
                    got: value.kind().to_string(),
                })
            }
        }
        Ok(())
    }

    /// Length word followed by the data, right-padded to a word boundary
    fn write_dynamic_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(&word(U256::from(data.len())));
        self.buf.extend_from_slice(data);
        self.buf.resize(self.buf.len() + padding(data.len()), 0);
    }
}

fn overflow(ty: &SolidityType, value: &dyn std::fmt::Display) -> AbiError {
    AbiError::Overflow {
        type_name: ty.canonical(),
        value: value.to_string(),
    }
}

/// Encode a function call: selector followed by the arguments
pub fn encode_call(call: &MethodCall<'_>) -> Result<Vec<u8>, AbiError> {
    let mut encoder = Encoder::new();
    encoder.write_method(call)?;
    Ok(encoder.into_bytes())
}

/// Encode a bare parameter tuple, as used for return data and log data
pub fn encode_values(types: &[SolidityType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let mut encoder = Encoder::new();
    encoder.write_values(types, values)?;
    Ok(encoder.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::function::{FunctionDef, Param};
    use crate::utils::crypto::hex_literal;

    fn ty(s: &str) -> SolidityType {
        SolidityType::parse(s).unwrap()
    }

    #[test]
    fn test_encode_uint256() {
        let encoded = encode_values(&[ty("uint256")], &[AbiValue::uint(256)]).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[30], 1);
        assert_eq!(encoded[31], 0);
    }

    #[test]
    fn test_encode_address() {
        let value = AbiValue::address_from_str("0xde000000000000000000000000000000000000ad").unwrap();
        let encoded = encode_values(&[ty("address")], &[value]).unwrap();
        assert_eq!(encoded.len(), 32);
        assert!(encoded[..12].iter().all(|&b| b == 0));
        assert_eq!(encoded[12], 0xde);
        assert_eq!(encoded[31], 0xad);
    }

    #[test]
    fn test_encode_bool() {
        let encoded = encode_values(&[ty("bool"), ty("bool")], &[true.into(), false.into()]).unwrap();
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 0);
    }

    #[test]
    fn test_encode_negative_int_sign_extends() {
        let encoded = encode_values(&[ty("int8")], &[AbiValue::int(-1)]).unwrap();
        assert_eq!(encoded, vec![0xff; 32]);

        let encoded = encode_values(&[ty("int256")], &[AbiValue::int(-2)]).unwrap();
        assert_eq!(encoded[31], 0xfe);
        assert!(encoded[..31].iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_encode_range_checks() {
        assert!(encode_values(&[ty("uint8")], &[AbiValue::uint(255)]).is_ok());
        assert!(matches!(
            encode_values(&[ty("uint8")], &[AbiValue::uint(256)]),
            Err(AbiError::Overflow { .. })
        ));
        assert!(encode_values(&[ty("int8")], &[AbiValue::int(127)]).is_ok());
        assert!(encode_values(&[ty("int8")], &[AbiValue::int(-128)]).is_ok());
        assert!(encode_values(&[ty("int8")], &[AbiValue::int(128)]).is_err());
        assert!(encode_values(&[ty("int8")], &[AbiValue::int(-129)]).is_err());
    }

    #[test]
    fn test_encode_fixed_bytes() {
        let encoded = encode_values(&[ty("bytes4")], &[AbiValue::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef])]).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(encoded[4..].iter().all(|&b| b == 0));

        assert!(encode_values(&[ty("bytes4")], &[AbiValue::FixedBytes(vec![1, 2])]).is_err());
    }

    #[test]
    fn test_encode_dynamic_bytes() {
        let encoded = encode_values(&[ty("bytes")], &[AbiValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef])]).unwrap();
        // offset + length + one padded word
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 4);
        assert_eq!(&encoded[64..68], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_word_aligned_string_gets_no_padding() {
        let s = "a".repeat(32);
        let encoded = encode_values(&[ty("string")], &[s.as_str().into()]).unwrap();
        assert_eq!(encoded.len(), 96);
    }

    #[test]
    fn test_static_fixed_array_is_inline() {
        let values = AbiValue::Array(vec![AbiValue::uint(1), AbiValue::uint(2)]);
        let encoded = encode_values(&[ty("uint256[2]"), ty("bool")], &[values, true.into()]).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 2);
        assert_eq!(encoded[95], 1);
    }

    #[test]
    fn test_encode_transfer_call() {
        let function = FunctionDef::new(
            "transfer",
            vec![Param::new("to", "address").unwrap(), Param::new("amount", "uint256").unwrap()],
        );
        let args = vec![
            AbiValue::address_from_str("0xaadf939f7d1a1bd24a4b2f95fbac3c8a5c1ebfad").unwrap(),
            AbiValue::uint_from_str("1000000000000000000000").unwrap(),
        ];
        let call = MethodCall::new(&function, args).unwrap();
        let encoded = encode_call(&call).unwrap();

        let expected = hex_literal(concat!(
            "a9059cbb",
            "000000000000000000000000aadf939f7d1a1bd24a4b2f95fbac3c8a5c1ebfad",
            "00000000000000000000000000000000000000000000003635c9adc5dea00000",
        ));
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_dynamic_offsets_are_backfilled() {
        // f(string,uint256,bytes): offsets point past the 3-word head
        let function = FunctionDef::from_signature("f(string,uint256,bytes)").unwrap();
        let call = MethodCall::new(
            &function,
            vec!["hi".into(), AbiValue::uint(7), AbiValue::Bytes(vec![1, 2, 3])],
        )
        .unwrap();
        let encoded = encode_call(&call).unwrap();
        let params = &encoded[4..];

        assert_eq!(params[31], 0x60);
        assert_eq!(params[63], 7);
        assert_eq!(params[95], 0xa0);
        assert_eq!(params[0x60 + 31], 2);
        assert_eq!(&params[0x80..0x82], b"hi");
        assert_eq!(params[0xa0 + 31], 3);
        assert_eq!(params.len(), 0xe0);
    }

    #[test]
    fn test_nested_dynamic_array() {
        let value = AbiValue::Array(vec!["a".into(), "b".into()]);
        let encoded = encode_values(&[ty("string[]")], &[value]).unwrap();

        // outer offset, length, two element offsets, two (length, data) pairs
        assert_eq!(encoded.len(), 32 * 8);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 2);
        // element offsets are relative to the element area
        assert_eq!(encoded[95], 0x40);
        assert_eq!(encoded[127], 0x80);
    }

    #[test]
    fn test_type_mismatch() {
        assert!(matches!(
            encode_values(&[ty("bool")], &[AbiValue::uint(1)]),
            Err(AbiError::TypeMismatch { .. })
        ));
        assert!(encode_values(&[ty("bool")], &[]).is_err());
    }
}
