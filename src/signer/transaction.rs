//! Legacy transactions and signatures

use std::fmt;

use ethers_core::types::{Address, Bytes, H256, U256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};

use super::{SignerError, SignerResult};
use crate::rlp::{self, Decodable, Encodable, Item, ListDecoder, ListEncoder, RlpError};
use crate::utils::crypto::{keccak256, public_key_to_address};

/// Offset folded into `v` for EIP-155 signatures
const EIP155_OFFSET: u64 = 35;
/// Offset of pre-EIP-155 `v` values
const LEGACY_OFFSET: u64 = 27;

/// A legacy (type 0) transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    /// `None` signs without replay protection
    pub chain_id: Option<u64>,
}

impl LegacyTransaction {
    /// Append the six common fields
    fn append_fields(&self, list: &mut ListEncoder) -> Result<(), RlpError> {
        list.append(&self.nonce)?
            .append(&self.gas_price)?
            .append(&self.gas_limit)?;
        match &self.to {
            Some(to) => list.append(to)?,
            None => list.append(&[0u8; 0])?,
        };
        list.append(&self.value)?.append(&self.data)?;
        Ok(())
    }

    /// RLP payload that gets signed:
    /// `(nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0)`, or the
    /// first six fields when there is no chain id
    pub fn signing_payload(&self) -> Result<Vec<u8>, RlpError> {
        let mut list = ListEncoder::new();
        self.append_fields(&mut list)?;
        if let Some(chain_id) = self.chain_id {
            list.append(&chain_id)?.append(&0u8)?.append(&0u8)?;
        }
        Ok(list.into_bytes())
    }

    /// `keccak256` of the signing payload
    pub fn signing_hash(&self) -> Result<H256, RlpError> {
        Ok(H256(keccak256(&self.signing_payload()?)))
    }
}

/// An ECDSA signature with the recovery value folded into `v`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signature {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl Signature {
    /// Recovery parity (0 or 1) from any accepted form of `v`
    pub fn parity(&self) -> SignerResult<u8> {
        match self.v {
            0 | 1 => Ok(self.v as u8),
            27 | 28 => Ok((self.v - LEGACY_OFFSET) as u8),
            v if v >= EIP155_OFFSET => Ok(((v - EIP155_OFFSET) % 2) as u8),
            v => Err(SignerError::InvalidRecoveryId(v)),
        }
    }

    /// Chain id encoded in an EIP-155 `v`
    pub fn chain_id(&self) -> Option<u64> {
        (self.v >= EIP155_OFFSET).then(|| (self.v - EIP155_OFFSET) / 2)
    }

    /// Wire layout `r || s || v`. A `v` that does not fit in one byte is
    /// written in its 27/28 form.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        self.r.to_big_endian(&mut out[..32]);
        self.s.to_big_endian(&mut out[32..64]);
        out[64] = match u8::try_from(self.v) {
            Ok(v) => v,
            Err(_) => (LEGACY_OFFSET + (self.v - EIP155_OFFSET) % 2) as u8,
        };
        out
    }

    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        Signature {
            r: U256::from_big_endian(&bytes[..32]),
            s: U256::from_big_endian(&bytes[32..64]),
            v: bytes[64] as u64,
        }
    }

    /// Recover the address that produced this signature over `hash`
    pub fn recover(&self, hash: H256) -> SignerResult<Address> {
        let recovery_id = RecoveryId::from_i32(self.parity()? as i32)
            .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;

        let mut compact = [0u8; 64];
        self.r.to_big_endian(&mut compact[..32]);
        self.s.to_big_endian(&mut compact[32..]);
        let signature = RecoverableSignature::from_compact(&compact, recovery_id)
            .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;

        let secp = Secp256k1::verification_only();
        let public_key = secp
            .recover_ecdsa(&Message::from_digest(hash.0), &signature)
            .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;
        Ok(public_key_to_address(&public_key.serialize_uncompressed()))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

/// A transaction together with its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: LegacyTransaction,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Raw transaction: `(nonce, gasPrice, gasLimit, to, value, data, v, r, s)`
    pub fn raw(&self) -> Result<Vec<u8>, RlpError> {
        rlp::encode(self)
    }

    /// Transaction hash: `keccak256(raw)`
    pub fn hash(&self) -> Result<H256, RlpError> {
        Ok(H256(keccak256(&self.raw()?)))
    }

    /// Parse a raw signed transaction
    pub fn decode(raw: &[u8]) -> Result<Self, RlpError> {
        rlp::decode(raw)
    }

    /// Recover the sender address
    pub fn recover_signer(&self) -> SignerResult<Address> {
        let hash = self.transaction.signing_hash()?;
        self.signature.recover(hash)
    }
}

impl Encodable for SignedTransaction {
    fn rlp_append(&self, out: &mut Vec<u8>) -> Result<(), RlpError> {
        let mut list = ListEncoder::new();
        self.transaction.append_fields(&mut list)?;
        list.append(&self.signature.v)?
            .append(&self.signature.r)?
            .append(&self.signature.s)?;
        list.finish(out);
        Ok(())
    }
}

impl Decodable for SignedTransaction {
    fn rlp_decode(item: &Item<'_>) -> Result<Self, RlpError> {
        let mut fields = ListDecoder::new(item, 9)?;
        let nonce = fields.field()?;
        let gas_price = fields.field()?;
        let gas_limit = fields.field()?;
        let to: Bytes = fields.field()?;
        let to = match to.len() {
            0 => None,
            20 => Some(Address::from_slice(&to)),
            got => return Err(RlpError::UnexpectedLength { expected: 20, got }),
        };
        let value = fields.field()?;
        let data = fields.field()?;
        let signature = Signature {
            v: fields.field()?,
            r: fields.field()?,
            s: fields.field()?,
        };

        Ok(SignedTransaction {
            transaction: LegacyTransaction {
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                data,
                chain_id: signature.chain_id(),
            },
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::hex_literal;

    fn eip155_example() -> LegacyTransaction {
        LegacyTransaction {
            nonce: U256::from(9),
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: U256::from(21_000),
            to: Some(Address::repeat_byte(0x35)),
            value: U256::exp10(18),
            data: Bytes::default(),
            chain_id: Some(1),
        }
    }

    #[test]
    fn test_signing_payload() {
        let payload = eip155_example().signing_payload().unwrap();
        assert_eq!(
            payload,
            hex_literal("ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080")
        );
    }

    #[test]
    fn test_signing_hash() {
        let hash = eip155_example().signing_hash().unwrap();
        assert_eq!(
            hex::encode(hash),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_contract_creation_has_empty_to() {
        let tx = LegacyTransaction {
            to: None,
            chain_id: None,
            ..eip155_example()
        };
        let payload = tx.signing_payload().unwrap();
        let items = rlp::decode_flat(&payload).unwrap();
        assert_eq!(items.len(), 6);
        assert!(items[3].is_empty());
    }

    #[test]
    fn test_parity_and_chain_id() {
        let sig = |v| Signature { v, ..Default::default() };
        assert_eq!(sig(0).parity().unwrap(), 0);
        assert_eq!(sig(28).parity().unwrap(), 1);
        assert_eq!(sig(37).parity().unwrap(), 0);
        assert_eq!(sig(38).parity().unwrap(), 1);
        assert_eq!(sig(38).chain_id(), Some(1));
        assert_eq!(sig(27).chain_id(), None);
        // chain 137: 137 * 2 + 35 + 1
        assert_eq!(sig(310).chain_id(), Some(137));
        assert_eq!(sig(310).parity().unwrap(), 1);
        assert_eq!(sig(5).parity(), Err(SignerError::InvalidRecoveryId(5)));
    }

    #[test]
    fn test_signature_bytes() {
        let signature = Signature {
            v: 37,
            r: U256::from(1),
            s: U256::from(2),
        };
        let bytes = signature.to_bytes();
        assert_eq!(bytes[31], 1);
        assert_eq!(bytes[63], 2);
        assert_eq!(bytes[64], 37);
        assert_eq!(Signature::from_bytes(&bytes), signature);

        let wide = Signature { v: 310, ..signature };
        assert_eq!(wide.to_bytes()[64], 28);
    }
}
