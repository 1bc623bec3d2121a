//! EIP-155 Transaction Signing
//!
//! Signs legacy transactions with replay protection and recovers signer
//! addresses from signatures.
//!
//! Reference: https://eips.ethereum.org/EIPS/eip-155
//!
//! `v = chain_id * 2 + 35 + parity`

mod local;
mod recover;
mod transaction;


pub use local::Signer;
pub use recover::{personal_message_hash, recover_personal_signer, recover_signer};
pub use transaction::{LegacyTransaction, SignedTransaction, Signature};

use crate::rlp::RlpError;

/// Signing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid recovery value v = {0}")]
    InvalidRecoveryId(u64),

    #[error("chain id {0} is too large for an EIP-155 v value")]
    InvalidChainId(u64),

    #[error("transaction is for chain {transaction} but the signer is bound to chain {signer}")]
    ChainIdMismatch { signer: u64, transaction: u64 },

    #[error("RLP error: {0}")]
    Rlp(#[from] RlpError),
}

pub type SignerResult<T> = Result<T, SignerError>;
