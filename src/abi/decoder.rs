//! ABI decoder for Solidity/EVM contracts
//!
//! A cursor over immutable calldata. Dynamic parameters are read by jumping
//! to their offset and restoring the cursor to the next head slot.

use ethers_core::types::{Address, H256, I256, U256};

use super::encoder::{int_fits, padding};
use super::function::{LogEvent, MethodCall};
use super::registry::AbiLookup;
use super::types::SolidityType;
use super::value::AbiValue;
use super::AbiError;
use crate::config::CodecConfig;
use crate::log_debug;

/// Clamp a word to `usize` so oversized lengths still fail the bounds check
fn saturating_usize(value: U256) -> usize {
    if value > U256::from(usize::MAX) {
        usize::MAX
    } else {
        value.as_usize()
    }
}

/// Cursor-based ABI decoder
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    offset: usize,
    config: CodecConfig,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, CodecConfig::default())
    }

    pub fn with_config(data: &'a [u8], config: CodecConfig) -> Self {
        Decoder { data, offset: 0, config }
    }

    /// Current cursor position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], AbiError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(AbiError::InsufficientData {
                requested: len,
                remaining,
            });
        }
        let out = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(out)
    }

    fn read_word(&mut self) -> Result<&'a [u8], AbiError> {
        self.take(32)
    }

    fn read_u256(&mut self) -> Result<U256, AbiError> {
        Ok(U256::from_big_endian(self.read_word()?))
    }

    /// Resolve the selector through `lookup`, then decode the arguments
    pub fn read_method_call<'l, L>(&mut self, lookup: &'l L) -> Result<MethodCall<'l>, AbiError>
    where
        L: AbiLookup + ?Sized,
    {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(self.take(4)?);

        let function = lookup
            .function_by_selector(selector)
            .ok_or(AbiError::UnknownSelector(selector))?;

        log_debug!(
            &self.config,
            "abi::decoder",
            "resolved selector",
            selector = hex::encode(selector),
            function = function.signature(),
        );

        let args = self.read_tuple(function.inputs().iter().map(|p| &p.kind))?;
        Ok(MethodCall { function, args })
    }

    /// Read one value at the cursor. Dynamic types are read in place: a
    /// length word (or member heads) followed by the payload.
    pub fn read(&mut self, ty: &SolidityType) -> Result<AbiValue, AbiError> {
        match ty {
            SolidityType::Boolean => {
                let v = self.read_u256()?;
                match v.low_u64() {
                    0 if v.is_zero() => Ok(AbiValue::Bool(false)),
                    1 if v.bits() == 1 => Ok(AbiValue::Bool(true)),
                    _ => Err(AbiError::InvalidValue(format!("bool word must be 0 or 1, got {v:#x}"))),
                }
            }
            SolidityType::Address => {
                let word = self.read_word()?;
                if word[..12].iter().any(|&b| b != 0) {
                    return Err(AbiError::InvalidValue(format!(
                        "address word has non-zero upper bytes: 0x{}",
                        hex::encode(word)
                    )));
                }
                Ok(AbiValue::Address(Address::from_slice(&word[12..])))
            }
            SolidityType::UnsignedInteger { bits, .. } | SolidityType::UnsignedFixedPoint { bits, .. } => {
                let v = self.read_u256()?;
                if v.bits() > *bits {
                    return Err(AbiError::InvalidValue(format!("{v} does not fit in {ty}")));
                }
                Ok(AbiValue::Uint(v))
            }
            SolidityType::SignedInteger { bits, .. } | SolidityType::SignedFixedPoint { bits, .. } => {
                let v = I256::from_raw(self.read_u256()?);
                if !int_fits(v, *bits) {
                    return Err(AbiError::InvalidValue(format!("{v} is not a sign-extended {ty}")));
                }
                Ok(AbiValue::Int(v))
            }
            SolidityType::FixedSizeBytes { bytes } => {
                let word = self.read_word()?;
                if word[*bytes..].iter().any(|&b| b != 0) {
                    return Err(AbiError::InvalidValue(format!("{ty} word has non-zero padding")));
                }
                Ok(AbiValue::FixedBytes(word[..*bytes].to_vec()))
            }
            SolidityType::Bytes => Ok(AbiValue::Bytes(self.read_dynamic_bytes()?.to_vec())),
            SolidityType::String => {
                let data = self.read_dynamic_bytes()?;
                let s = std::str::from_utf8(data).map_err(|_| AbiError::InvalidUtf8)?;
                Ok(AbiValue::String(s.to_string()))
            }
            SolidityType::Array { element } => {
                let length = self.read_u256()?;
                // every element needs at least one head word
                let requested = saturating_usize(length).saturating_mul(32);
                if requested > self.remaining() {
                    return Err(AbiError::InsufficientData {
                        requested,
                        remaining: self.remaining(),
                    });
                }
                let length = length.as_usize();
                let items = self.read_tuple(std::iter::repeat(element.as_ref()).take(length))?;
                Ok(AbiValue::Array(items))
            }
            SolidityType::FixedSizeArray { element, length } => {
                let items = self.read_tuple(std::iter::repeat(element.as_ref()).take(*length))?;
                Ok(AbiValue::Array(items))
            }
            SolidityType::Struct(members) => Ok(AbiValue::Tuple(self.read_tuple(members.iter())?)),
        }
    }

    /// Length word followed by the padded payload
    fn read_dynamic_bytes(&mut self) -> Result<&'a [u8], AbiError> {
        let length = saturating_usize(self.read_u256()?);
        let padded = length.saturating_add(padding(length));
        let remaining = self.remaining();
        if padded > remaining {
            return Err(AbiError::InsufficientData {
                requested: padded,
                remaining,
            });
        }
        let data = self.take(padded)?;
        Ok(&data[..length])
    }

    /// Read a sequence of values whose heads start at the cursor. Offsets of
    /// dynamic members are relative to that start.
    fn read_tuple<'t, I>(&mut self, types: I) -> Result<Vec<AbiValue>, AbiError>
    where
        I: IntoIterator<Item = &'t SolidityType>,
    {
        let base = self.offset;
        let max = self.remaining().saturating_sub(32);
        let mut values = Vec::new();

        for (index, ty) in types.into_iter().enumerate() {
            if !ty.is_dynamic() {
                values.push(self.read(ty)?);
                continue;
            }

            let offset = self.read_u256()?;
            if offset > U256::from(max) {
                return Err(AbiError::OffsetOutOfBounds {
                    index,
                    type_name: ty.canonical(),
                    offset,
                    max,
                });
            }

            let resume = self.offset;
            self.offset = base + offset.as_usize();
            let value = self.read(ty);
            self.offset = resume;
            values.push(value?);
        }
        Ok(values)
    }
}

/// Decode a bare parameter tuple such as function return data
pub fn decode_values(types: &[SolidityType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    Decoder::new(data).read_tuple(types.iter())
}

/// Decode calldata into a method call, resolving the selector through `lookup`
pub fn decode_call<'l, L>(lookup: &'l L, data: &[u8]) -> Result<MethodCall<'l>, AbiError>
where
    L: AbiLookup + ?Sized,
{
    Decoder::new(data).read_method_call(lookup)
}

/// Decode a log entry
///
/// `topics[0]` selects the event; indexed parameters come from the remaining
/// topics in order. Indexed dynamic parameters only carry their hash and are
/// returned as a 32-byte `FixedBytes`.
pub fn decode_log<'l, L>(lookup: &'l L, topics: &[H256], data: &[u8]) -> Result<LogEvent<'l>, AbiError>
where
    L: AbiLookup + ?Sized,
{
    let first = topics.first().ok_or_else(|| AbiError::MissingTopic {
        event: "<unresolved>".to_string(),
        index: 0,
    })?;
    let event = lookup
        .event_by_topic(*first)
        .ok_or(AbiError::UnknownTopic(first.0))?;

    let data_types: Vec<SolidityType> = event
        .inputs()
        .iter()
        .filter(|p| !p.indexed)
        .map(|p| p.kind.clone())
        .collect();
    let mut data_values = decode_values(&data_types, data)?.into_iter();

    let mut topic_index = 1;
    let mut values = Vec::with_capacity(event.inputs().len());
    for param in event.inputs() {
        let value = if param.indexed {
            let topic = topics.get(topic_index).ok_or_else(|| AbiError::MissingTopic {
                event: event.signature().to_string(),
                index: topic_index,
            })?;
            topic_index += 1;
            if param.kind.is_dynamic() {
                AbiValue::FixedBytes(topic.as_bytes().to_vec())
            } else {
                Decoder::new(topic.as_bytes()).read(&param.kind)?
            }
        } else {
            data_values.next().ok_or(AbiError::InsufficientData {
                requested: 32,
                remaining: 0,
            })?
        };
        values.push((param.name.clone(), value));
    }

    Ok(LogEvent { event, values })
}
