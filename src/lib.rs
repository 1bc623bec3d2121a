//! evm-codec
//!
//! Low-level encoding and signing core for Ethereum clients.
//!
//! # Architecture
//!
//! This crate provides:
//! - **abi**: Solidity type descriptors, calldata encoding/decoding, selectors and topics
//! - **rlp**: Canonical Recursive Length Prefix encoding/decoding
//! - **signer**: EIP-155 legacy transaction signing and signer recovery
//!
//! The ABI and RLP codecs are independent; the signer builds its payloads
//! with the RLP codec.
//!
//! # Security
//!
//! Private keys are held in `zeroize` wrappers while parsed and the secp256k1
//! secret is erased when a [`Signer`](signer::Signer) is dropped. Debug logs
//! redact key material and shorten addresses and hashes.
//!
//! # Example
//!
//! ```rust
//! use evm_codec::abi::{encode_call, AbiValue, FunctionDef, MethodCall};
//!
//! let transfer = FunctionDef::from_signature("transfer(address,uint256)")?;
//! let call = MethodCall::new(
//!     &transfer,
//!     vec![
//!         AbiValue::address_from_str("0x3535353535353535353535353535353535353535")?,
//!         AbiValue::uint(1_000),
//!     ],
//! )?;
//! let calldata = encode_call(&call)?;
//! assert_eq!(&calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//! # Ok::<(), evm_codec::abi::AbiError>(())
//! ```

pub mod abi;
pub mod config;
pub mod error;
pub mod rlp;
pub mod signer;
pub mod utils;

pub use config::CodecConfig;
pub use error::{Error, ErrorKind, Result};

pub use utils::crypto::{keccak256, to_checksum_address};
