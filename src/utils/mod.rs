//! Utilities Module
//!
//! Hashing, hex and logging helpers shared across the crate.

pub mod crypto;
pub mod logging;

pub use crypto::*;
