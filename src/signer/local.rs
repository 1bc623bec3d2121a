//! Local private-key signer

use std::fmt;

use ethers_core::types::{Address, H256, U256};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroizing;

use super::recover::personal_message_hash;
use super::transaction::{LegacyTransaction, SignedTransaction, Signature};
use super::{SignerError, SignerResult};
use crate::config::CodecConfig;
use crate::log_debug;
use crate::utils::crypto::{public_key_to_address, to_checksum_address};

/// Signs transactions and messages with one secp256k1 key, bound to a chain
pub struct Signer {
    secp: Secp256k1<All>,
    secret_key: SecretKey,
    address: Address,
    chain_id: u64,
    config: CodecConfig,
}

impl Signer {
    pub fn new(private_key: [u8; 32], chain_id: u64) -> SignerResult<Self> {
        Self::with_config(private_key, chain_id, CodecConfig::default())
    }

    pub fn with_config(private_key: [u8; 32], chain_id: u64, config: CodecConfig) -> SignerResult<Self> {
        let private_key = Zeroizing::new(private_key);
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&private_key[..])
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = public_key_to_address(&public_key.serialize_uncompressed());

        Ok(Signer {
            secp,
            secret_key,
            address,
            chain_id,
            config,
        })
    }

    /// Parse a hex private key (`0x` optional)
    pub fn from_hex(private_key: &str, chain_id: u64) -> SignerResult<Self> {
        let bytes = Zeroizing::new(
            crate::utils::crypto::decode_hex(private_key)
                .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?,
        );
        let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            SignerError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Self::new(key, chain_id)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a 32-byte digest. Returns the parity and the `r`, `s` halves.
    fn sign_digest(&self, hash: H256) -> (u64, U256, U256) {
        let message = Message::from_digest(hash.0);
        let signature = self.secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();
        (
            recovery_id.to_i32() as u64,
            U256::from_big_endian(&compact[..32]),
            U256::from_big_endian(&compact[32..]),
        )
    }

    /// Sign a hash with a pre-EIP-155 `v` (27/28)
    pub fn sign_hash(&self, hash: H256) -> Signature {
        let (parity, r, s) = self.sign_digest(hash);
        Signature { v: 27 + parity, r, s }
    }

    /// Sign a message with the personal-message prefix
    pub fn sign_personal_message(&self, message: &[u8]) -> Signature {
        self.sign_hash(personal_message_hash(message))
    }

    /// Sign a legacy transaction with EIP-155 replay protection.
    ///
    /// A transaction without a chain id is signed for the signer's chain; one
    /// with a different chain id is rejected.
    pub fn sign_transaction(&self, transaction: &LegacyTransaction) -> SignerResult<SignedTransaction> {
        let chain_id = match transaction.chain_id {
            Some(id) if id != self.chain_id => {
                return Err(SignerError::ChainIdMismatch {
                    signer: self.chain_id,
                    transaction: id,
                })
            }
            _ => self.chain_id,
        };
        let transaction = LegacyTransaction {
            chain_id: Some(chain_id),
            ..transaction.clone()
        };

        let hash = transaction.signing_hash()?;
        let (parity, r, s) = self.sign_digest(hash);
        let v = eip155_v(chain_id, parity)?;

        log_debug!(
            &self.config,
            "signer",
            "signed transaction",
            chain_id = chain_id,
            nonce = transaction.nonce,
            signer = to_checksum_address(self.address.as_bytes()),
            hash = hex::encode(hash),
            v = v,
        );

        Ok(SignedTransaction {
            transaction,
            signature: Signature { v, r, s },
        })
    }
}

/// `chain_id * 2 + 35 + parity`, rejecting chain ids that overflow `u64`
fn eip155_v(chain_id: u64, parity: u64) -> SignerResult<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(35))
        .and_then(|v| v.checked_add(parity))
        .ok_or(SignerError::InvalidChainId(chain_id))
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl Drop for Signer {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_key() {
        let signer = Signer::new([0x46; 32], 1).unwrap();
        assert_eq!(
            to_checksum_address(signer.address().as_bytes()),
            "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F"
        );
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(Signer::new([0; 32], 1), Err(SignerError::InvalidPrivateKey(_))));
        assert!(matches!(Signer::new([0xff; 32], 1), Err(SignerError::InvalidPrivateKey(_))));
        assert!(matches!(Signer::from_hex("0x1234", 1), Err(SignerError::InvalidPrivateKey(_))));
        assert!(Signer::from_hex(&"46".repeat(32), 1).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let signer = Signer::new([0x46; 32], 1).unwrap();
        let debug = format!("{signer:?}");
        assert!(!debug.contains("4646"));
        assert!(debug.contains("chain_id"));
    }

    #[test]
    fn test_sign_hash_uses_legacy_v() {
        let signer = Signer::new([0x46; 32], 1).unwrap();
        let signature = signer.sign_hash(H256::repeat_byte(0x01));
        assert!(signature.v == 27 || signature.v == 28);
        assert_eq!(signature.recover(H256::repeat_byte(0x01)).unwrap(), signer.address());
    }

    #[test]
    fn test_eip155_v_bounds() {
        assert_eq!(eip155_v(1, 0), Ok(37));
        assert_eq!(eip155_v(1, 1), Ok(38));
        let largest = (u64::MAX - 36) / 2;
        assert_eq!(eip155_v(largest, 1), Ok(u64::MAX - 1));
        assert_eq!(eip155_v(u64::MAX / 2, 0), Err(SignerError::InvalidChainId(u64::MAX / 2)));
        assert_eq!(eip155_v(u64::MAX, 0), Err(SignerError::InvalidChainId(u64::MAX)));
    }

    #[test]
    fn test_oversized_chain_id_is_rejected() {
        let signer = Signer::new([0x46; 32], u64::MAX / 2).unwrap();
        assert_eq!(
            signer.sign_transaction(&LegacyTransaction::default()),
            Err(SignerError::InvalidChainId(u64::MAX / 2))
        );
    }

    #[test]
    fn test_chain_id_mismatch() {
        let signer = Signer::new([0x46; 32], 1).unwrap();
        let transaction = LegacyTransaction {
            chain_id: Some(5),
            ..Default::default()
        };
        assert_eq!(
            signer.sign_transaction(&transaction),
            Err(SignerError::ChainIdMismatch { signer: 1, transaction: 5 })
        );
    }
}
