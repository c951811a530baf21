//! Wallet address validation
//!
//! Pure helper used before any upload or persistence happens. Matches
//! the semantics of `ethers.isAddress`: 0x-prefixed 40-hex-char
//! strings, with the EIP-55 checksum enforced whenever the input mixes
//! upper- and lowercase hex digits.

use alloy::primitives::Address;
use std::str::FromStr;

/// Report whether `input` is a well-formed chain account address.
///
/// Never panics; any parse failure reports `false`.
pub fn is_valid_address(input: &str) -> bool {
    let Some(digits) = input.strip_prefix("0x") else {
        return false;
    };

    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        // Mixed case means the caller intended a checksummed address
        Address::parse_checksummed(input, None).is_ok()
    } else {
        Address::from_str(input).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Checksummed address from the EIP-55 reference vectors
    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn accepts_lowercase_address() {
        assert!(is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
    }

    #[test]
    fn accepts_valid_checksummed_address() {
        assert!(is_valid_address(CHECKSUMMED));
    }

    #[test]
    fn rejects_bad_checksum() {
        // Flip the case of one letter
        assert!(!is_valid_address("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert!(!is_valid_address("not-an-address"));
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x123"));
        assert!(!is_valid_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaeg"));
    }

    #[test]
    fn validation_is_deterministic() {
        for input in ["not-an-address", CHECKSUMMED] {
            assert_eq!(is_valid_address(input), is_valid_address(input));
        }
    }
}
