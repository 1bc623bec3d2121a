//! RLP (Recursive Length Prefix) codec
//!
//! Values are encoded through [`Encodable`] and decoded either flat
//! ([`decode_flat`]) or shape-driven through [`Decodable`]. Decoding only
//! accepts the canonical encoding of a value.

pub mod decode;
pub mod encode;


pub use decode::{decode, decode_flat, read_item, Decodable, Item, ListDecoder};
pub use encode::{encode, encode_length, Encodable, ListEncoder};

/// RLP errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RlpError {
    #[error("negative integers have no RLP encoding")]
    NegativeInteger,

    #[error("expected {expected} list items, got {got}")]
    FieldCountMismatch { expected: usize, got: usize },

    #[error("{0} trailing bytes after the encoded item")]
    TrailingBytes(usize),

    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    #[error("input too short")]
    InputTooShort,

    #[error("value does not fit in {0}")]
    Overflow(&'static str),

    #[error("expected a string, found a list")]
    UnexpectedList,

    #[error("expected a list, found a string")]
    UnexpectedString,

    #[error("expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type RlpResult<T> = Result<T, RlpError>;

/// Implement [`Encodable`] and [`Decodable`] for a struct as a list of its
/// fields in declaration order.
///
/// ```
/// use evm_codec::rlp_struct;
///
/// #[derive(Debug, PartialEq)]
/// struct Pair {
///     a: u64,
///     b: String,
/// }
/// rlp_struct!(Pair { a, b });
///
/// let pair = Pair { a: 1, b: "x".into() };
/// let bytes = evm_codec::rlp::encode(&pair).unwrap();
/// assert_eq!(bytes, vec![0xc2, 0x01, 0x78]);
/// assert_eq!(evm_codec::rlp::decode::<Pair>(&bytes).unwrap(), pair);
/// ```
#[macro_export]
macro_rules! rlp_struct {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::rlp::Encodable for $name {
            fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), $crate::rlp::RlpError> {
                let mut list = $crate::rlp::ListEncoder::new();
                $( list.append(&self.$field)?; )+
                list.finish(out);
                Ok(())
            }
        }

        impl $crate::rlp::Decodable for $name {
            fn rlp_decode(item: &$crate::rlp::Item<'_>) -> Result<Self, $crate::rlp::RlpError> {
                const FIELDS: usize = [$(stringify!($field)),+].len();
                let mut fields = $crate::rlp::ListDecoder::new(item, FIELDS)?;
                Ok($name {
                    $( $field: fields.field()?, )+
                })
            }
        }
    };
}
