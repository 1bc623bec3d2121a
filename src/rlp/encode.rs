//! RLP encoding

use ethers_core::types::{Address, Bytes, H256, U256};

use super::RlpError;

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
/// Payloads up to this length use the short header form
const SHORT_LIMIT: usize = 55;

/// A value with a canonical RLP encoding
pub trait Encodable {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError>;
}

/// Encode a value
pub fn encode<T: Encodable + ?Sized>(value: &T) -> Result<Vec<u8>, RlpError> {
    let mut out = Vec::new();
    value.rlp_append(&mut out)?;
    Ok(out)
}

/// Minimal big-endian bytes of a length
pub fn encode_length(len: usize) -> Vec<u8> {
    let bytes = len.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn append_header(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len <= SHORT_LIMIT {
        out.push(offset + len as u8);
    } else {
        let len_bytes = encode_length(len);
        out.push(offset + SHORT_LIMIT as u8 + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

/// Append a byte string
pub(crate) fn append_bytes(out: &mut Vec<u8>, data: &[u8]) {
    if data.len() == 1 && data[0] < STRING_OFFSET {
        out.push(data[0]);
    } else {
        append_header(out, data.len(), STRING_OFFSET);
        out.extend_from_slice(data);
    }
}

/// Append an unsigned integer given as big-endian bytes, dropping leading zeros
pub(crate) fn append_uint_bytes(out: &mut Vec<u8>, be: &[u8]) {
    let start = be.iter().position(|&b| b != 0).unwrap_or(be.len());
    append_bytes(out, &be[start..]);
}

/// Builds a list item out of encoded members
#[derive(Debug, Default)]
pub struct ListEncoder {
    payload: Vec<u8>,
}

impl ListEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append<T: Encodable + ?Sized>(&mut self, value: &T) -> Result<&mut Self, RlpError> {
        value.rlp_append(&mut self.payload)?;
        Ok(self)
    }

    /// Append an already encoded item
    pub fn append_raw(&mut self, encoded: &[u8]) -> &mut Self {
        self.payload.extend_from_slice(encoded);
        self
    }

    /// Write the list header and payload to `out`
    pub fn finish(self, out: &mut Vec<u8>) {
        append_header(out, self.payload.len(), LIST_OFFSET);
        out.extend_from_slice(&self.payload);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        self.finish(&mut out);
        out
    }
}

macro_rules! impl_encodable_uint {
    ($($t:ty),*) => {$(
        impl Encodable for $t {
            fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
                append_uint_bytes(out, &self.to_be_bytes());
                Ok(())
            }
        }
    )*};
}

macro_rules! impl_encodable_int {
    ($($t:ty),*) => {$(
        impl Encodable for $t {
            fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
                if *self < 0 {
                    return Err(RlpError::NegativeInteger);
                }
                append_uint_bytes(out, &self.to_be_bytes());
                Ok(())
            }
        }
    )*};
}

impl_encodable_uint!(u8, u16, u32, u64, u128, usize);
impl_encodable_int!(i8, i16, i32, i64, i128, isize);

impl Encodable for bool {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        (*self as u8).rlp_append(out)
    }
}

impl Encodable for U256 {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        let mut be = [0u8; 32];
        self.to_big_endian(&mut be);
        append_uint_bytes(out, &be);
        Ok(())
    }
}

impl Encodable for Address {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        append_bytes(out, self.as_bytes());
        Ok(())
    }
}

impl Encodable for H256 {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        append_bytes(out, self.as_bytes());
        Ok(())
    }
}

impl Encodable for [u8] {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        append_bytes(out, self);
        Ok(())
    }
}

impl<const N: usize> Encodable for [u8; N] {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        append_bytes(out, self);
        Ok(())
    }
}

impl Encodable for Bytes {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        append_bytes(out, self.as_ref());
        Ok(())
    }
}

impl Encodable for str {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        append_bytes(out, self.as_bytes());
        Ok(())
    }
}

impl Encodable for String {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        self.as_str().rlp_append(out)
    }
}

/// Vectors are lists, including `Vec<u8>`; use `[u8]` or `Bytes` for byte strings
impl<T: Encodable> Encodable for Vec<T> {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        let mut list = ListEncoder::new();
        for item in self {
            list.append(item)?;
        }
        list.finish(out);
        Ok(())
    }
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        (**self).rlp_append(out)
    }
}
