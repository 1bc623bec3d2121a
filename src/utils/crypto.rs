//! Hashing and hex helpers
//!
//! Shared by the ABI codec (selectors, topics) and the signer
//! (signing hashes, address derivation).

use ethers_core::types::Address;
use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Derive an Ethereum address from a 65-byte uncompressed public key
/// (`0x04 || X || Y`): the low 20 bytes of `keccak256(X || Y)`.
pub fn public_key_to_address(uncompressed: &[u8; 65]) -> Address {
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Convert raw address bytes to checksummed Ethereum address (EIP-55)
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// Decode a hex string using the boundary convention shared by every
/// component: an optional `0x`/`0X` prefix is stripped, odd-length input is
/// left-padded with a single `0`, and the digits are lower-cased.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let mut normalized = String::with_capacity(digits.len() + 1);
    if digits.len() % 2 == 1 {
        normalized.push('0');
    }
    normalized.push_str(&digits.to_ascii_lowercase());

    hex::decode(normalized)
}

/// Decode a hex literal known to be well-formed at the call site.
///
/// # Panics
///
/// Panics if `input` is not valid hex. Only use with literals.
pub fn hex_literal(input: &str) -> Vec<u8> {
    match decode_hex(input) {
        Ok(bytes) => bytes,
        Err(e) => panic!("malformed hex literal {input:?}: {e}"),
    }
}

/// Encode bytes as `0x`-prefixed lowercase hex
pub fn encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"");
        assert_eq!(
            hex::encode(hash),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );

        let hash = keccak256(b"hello");
        assert_eq!(
            hex::encode(hash),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_checksum_address() {
        let addr_bytes = hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let checksummed = to_checksum_address(&addr_bytes);
        assert_eq!(checksummed, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_decode_hex_prefixes() {
        assert_eq!(decode_hex("0xdeadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_hex("0XDEADBEEF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_hex("DeadBeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_hex_odd_length() {
        assert_eq!(decode_hex("0x1").unwrap(), vec![0x01]);
        assert_eq!(decode_hex("abc").unwrap(), vec![0x0a, 0xbc]);
    }

    #[test]
    fn test_decode_hex_rejects_garbage() {
        assert!(decode_hex("0xzz").is_err());
    }

    #[test]
    #[should_panic(expected = "malformed hex literal")]
    fn test_hex_literal_panics() {
        hex_literal("0xnothex");
    }
}
