//! Function selector and event topic calculation

use ethers_core::types::H256;

use crate::utils::crypto::keccak256;

/// Function selector: first 4 bytes of `keccak256(signature)`
///
/// `signature` must be the comma-only canonical form, e.g.
/// `transfer(address,uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Event topic: `keccak256(signature)`
pub fn topic(signature: &str) -> H256 {
    H256(keccak256(signature.as_bytes()))
}

/// Well-known function selectors
pub struct KnownSelectors;

impl KnownSelectors {
    pub const TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb]; // transfer(address,uint256)
    pub const APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3]; // approve(address,uint256)
    pub const TRANSFER_FROM: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd]; // transferFrom(address,address,uint256)
    pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31]; // balanceOf(address)
    pub const TOTAL_SUPPLY: [u8; 4] = [0x18, 0x16, 0x0d, 0xdd]; // totalSupply()
}

/// Well-known event topics
pub struct KnownTopics;

impl KnownTopics {
    /// Transfer(address,address,uint256)
    pub const TRANSFER: [u8; 32] = [
        0xdd, 0xf2, 0x52, 0xad, 0x1b, 0xe2, 0xc8, 0x9b, 0x69, 0xc2, 0xb0, 0x68, 0xfc, 0x37, 0x8d, 0xaa,
        0x95, 0x2b, 0xa7, 0xf1, 0x63, 0xc4, 0xa1, 0x16, 0x28, 0xf5, 0x5a, 0x4d, 0xf5, 0x23, 0xb3, 0xef,
    ];
    /// Approval(address,address,uint256)
    pub const APPROVAL: [u8; 32] = [
        0x8c, 0x5b, 0xe1, 0xe5, 0xeb, 0xec, 0x7d, 0x5b, 0xd1, 0x4f, 0x71, 0x42, 0x7d, 0x1e, 0x84, 0xf3,
        0xdd, 0x03, 0x14, 0xc0, 0xf7, 0xb2, 0x29, 0x1e, 0x5b, 0x20, 0x0a, 0xc8, 0xc7, 0xc3, 0xb9, 0x25,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_selector() {
        assert_eq!(selector("transfer(address,uint256)"), KnownSelectors::TRANSFER);
    }

    #[test]
    fn test_known_selectors() {
        assert_eq!(selector("approve(address,uint256)"), KnownSelectors::APPROVE);
        assert_eq!(selector("transferFrom(address,address,uint256)"), KnownSelectors::TRANSFER_FROM);
        assert_eq!(selector("balanceOf(address)"), KnownSelectors::BALANCE_OF);
        assert_eq!(selector("totalSupply()"), KnownSelectors::TOTAL_SUPPLY);
    }

    #[test]
    fn test_transfer_topic() {
        assert_eq!(topic("Transfer(address,address,uint256)").0, KnownTopics::TRANSFER);
        assert_eq!(topic("Approval(address,address,uint256)").0, KnownTopics::APPROVAL);
    }

    #[test]
    fn test_spacing_changes_the_hash() {
        assert_ne!(selector("transfer(address, uint256)"), KnownSelectors::TRANSFER);
    }
}
