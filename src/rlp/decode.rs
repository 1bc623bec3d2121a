//! RLP decoding

use ethers_core::types::{Address, Bytes, H256, U256};

use super::RlpError;

/// One decoded item, borrowing its payload from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    String(&'a [u8]),
    List(&'a [u8]),
}

impl<'a> Item<'a> {
    /// Payload of a string item
    pub fn as_string(&self) -> Result<&'a [u8], RlpError> {
        match *self {
            Item::String(payload) => Ok(payload),
            Item::List(_) => Err(RlpError::UnexpectedList),
        }
    }

    /// Members of a list item
    pub fn list_items(&self) -> Result<Vec<Item<'a>>, RlpError> {
        let mut rest = match *self {
            Item::List(payload) => payload,
            Item::String(_) => return Err(RlpError::UnexpectedString),
        };
        let mut items = Vec::new();
        while !rest.is_empty() {
            let (item, tail) = read_item(rest)?;
            items.push(item);
            rest = tail;
        }
        Ok(items)
    }
}

fn split_at_checked(input: &[u8], len: usize) -> Result<(&[u8], &[u8]), RlpError> {
    if input.len() < len {
        return Err(RlpError::InputTooShort);
    }
    Ok(input.split_at(len))
}

/// Read a long-form length: `len_of_len` big-endian bytes, no leading zero,
/// and too large for the short form
fn read_long_length(input: &[u8], len_of_len: usize) -> Result<(usize, &[u8]), RlpError> {
    let (len_bytes, rest) = split_at_checked(input, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonical("leading zero in length"));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(RlpError::Overflow("usize"));
    }
    let len = len_bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len <= 55 {
        return Err(RlpError::NonCanonical("long form used for a short payload"));
    }
    Ok((len, rest))
}

/// Read one item from the front of `input`, returning it and the rest
pub fn read_item(input: &[u8]) -> Result<(Item<'_>, &[u8]), RlpError> {
    let (&prefix, rest) = input.split_first().ok_or(RlpError::InputTooShort)?;
    match prefix {
        0x00..=0x7f => Ok((Item::String(&input[..1]), rest)),
        0x80..=0xb7 => {
            let (payload, rest) = split_at_checked(rest, (prefix - 0x80) as usize)?;
            if payload.len() == 1 && payload[0] < 0x80 {
                return Err(RlpError::NonCanonical("single byte below 0x80 wrapped in a header"));
            }
            Ok((Item::String(payload), rest))
        }
        0xb8..=0xbf => {
            let (len, rest) = read_long_length(rest, (prefix - 0xb7) as usize)?;
            let (payload, rest) = split_at_checked(rest, len)?;
            Ok((Item::String(payload), rest))
        }
        0xc0..=0xf7 => {
            let (payload, rest) = split_at_checked(rest, (prefix - 0xc0) as usize)?;
            Ok((Item::List(payload), rest))
        }
        0xf8..=0xff => {
            let (len, rest) = read_long_length(rest, (prefix - 0xf7) as usize)?;
            let (payload, rest) = split_at_checked(rest, len)?;
            Ok((Item::List(payload), rest))
        }
    }
}

/// Decode every item in `input`, flattening lists, and return the string
/// payloads in order
///
/// Nesting depth is bounded only by the input length; pending slices live on
/// a heap stack, not the call stack.
pub fn decode_flat(input: &[u8]) -> Result<Vec<&[u8]>, RlpError> {
    let mut out = Vec::new();
    let mut pending = vec![input];
    while let Some(rest) = pending.pop() {
        if rest.is_empty() {
            continue;
        }
        let (item, tail) = read_item(rest)?;
        // siblings resume after the current item's members
        if !tail.is_empty() {
            pending.push(tail);
        }
        match item {
            Item::String(payload) => out.push(payload),
            Item::List(payload) => pending.push(payload),
        }
    }
    Ok(out)
}

/// A value that can be read from one RLP item
pub trait Decodable: Sized {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError>;
}

/// Decode exactly one item of type `T`
pub fn decode<T: Decodable>(input: &[u8]) -> Result<T, RlpError> {
    let (item, rest) = read_item(input)?;
    if !rest.is_empty() {
        return Err(RlpError::TrailingBytes(rest.len()));
    }
    T::rlp_decode(&item)
}

/// Positional access to the members of a list with a known field count
#[derive(Debug)]
pub struct ListDecoder<'a> {
    items: std::vec::IntoIter<Item<'a>>,
}

impl<'a> ListDecoder<'a> {
    pub fn new(item: &Item<'a>, expected: usize) -> Result<Self, RlpError> {
        let items = item.list_items()?;
        if items.len() != expected {
            return Err(RlpError::FieldCountMismatch {
                expected,
                got: items.len(),
            });
        }
        Ok(ListDecoder {
            items: items.into_iter(),
        })
    }

    /// Decode the next member
    pub fn field<T: Decodable>(&mut self) -> Result<T, RlpError> {
        let item = self.items.next().ok_or(RlpError::InputTooShort)?;
        T::rlp_decode(&item)
    }
}

/// Payload of an integer item: at most `max_len` bytes, no leading zero
fn uint_payload<'a>(item: &Item<'a>, max_len: usize, type_name: &'static str) -> Result<&'a [u8], RlpError> {
    let payload = item.as_string()?;
    if payload.len() > max_len {
        return Err(RlpError::Overflow(type_name));
    }
    if payload.first() == Some(&0) {
        return Err(RlpError::NonCanonical("leading zero in integer"));
    }
    Ok(payload)
}

macro_rules! impl_decodable_uint {
    ($($t:ty),*) => {$(
        impl Decodable for $t {
            fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
                let payload = uint_payload(item, std::mem::size_of::<$t>(), stringify!($t))?;
                // split shift: `<< 8` on u8 overflows
                Ok(payload.iter().fold(0, |acc: $t, &b| (acc << 4 << 4) | b as $t))
            }
        }
    )*};
}

macro_rules! impl_decodable_int {
    ($($t:ty => $u:ty),*) => {$(
        impl Decodable for $t {
            fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
                let value = <$u>::rlp_decode(item)?;
                <$t>::try_from(value).map_err(|_| RlpError::Overflow(stringify!($t)))
            }
        }
    )*};
}

impl_decodable_uint!(u8, u16, u32, u64, u128, usize);
impl_decodable_int!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128, isize => usize);

impl Decodable for bool {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        match u8::rlp_decode(item)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(RlpError::InvalidValue(format!("bool must be 0 or 1, got {other}"))),
        }
    }
}

impl Decodable for U256 {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        let payload = uint_payload(item, 32, "U256")?;
        Ok(U256::from_big_endian(payload))
    }
}

fn fixed_payload<'a>(item: &Item<'a>, expected: usize) -> Result<&'a [u8], RlpError> {
    let payload = item.as_string()?;
    if payload.len() != expected {
        return Err(RlpError::UnexpectedLength {
            expected,
            got: payload.len(),
        });
    }
    Ok(payload)
}

impl Decodable for Address {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        Ok(Address::from_slice(fixed_payload(item, 20)?))
    }
}

impl Decodable for H256 {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        Ok(H256::from_slice(fixed_payload(item, 32)?))
    }
}

impl<const N: usize> Decodable for [u8; N] {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        let mut out = [0u8; N];
        out.copy_from_slice(fixed_payload(item, N)?);
        Ok(out)
    }
}

impl Decodable for Bytes {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        Ok(Bytes::from(item.as_string()?.to_vec()))
    }
}

impl Decodable for String {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        let payload = item.as_string()?;
        String::from_utf8(payload.to_vec()).map_err(|e| RlpError::InvalidValue(e.to_string()))
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        item.list_items()?.iter().map(T::rlp_decode).collect()
    }
}
