//! Signer address recovery
//!
//! Personal messages (EIP-191) are hashed as
//! `"\x19Ethereum Signed Message:\n" + len(message) + message`.

use ethers_core::types::{Address, H256};

use super::transaction::Signature;
use super::SignerResult;
use crate::utils::crypto::keccak256;

/// Ethereum message prefix for personal_sign
const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hash a message with the personal-message prefix
pub fn personal_message_hash(message: &[u8]) -> H256 {
    let prefix = format!("{}{}", ETH_MESSAGE_PREFIX, message.len());
    let mut data = Vec::with_capacity(prefix.len() + message.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(message);
    H256(keccak256(&data))
}

/// Recover the signer of `hash` from a 65-byte `r || s || v` signature.
///
/// `v` may be the raw recovery id (0/1), the legacy 27/28 form, or an
/// EIP-155 value (35 and up).
pub fn recover_signer(signature: &[u8; 65], hash: H256) -> SignerResult<Address> {
    Signature::from_bytes(signature).recover(hash)
}

/// Recover the signer of a personal message
pub fn recover_personal_signer(signature: &[u8; 65], message: &[u8]) -> SignerResult<Address> {
    recover_signer(signature, personal_message_hash(message))
}
