//! Base58 and Base58Check encoding.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::hash::hash256;

pub const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Encodes `input` as Base58. Each leading zero byte becomes a leading
/// `'1'`; the remainder is converted as one big-endian integer.
pub fn encode_base58(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|byte| **byte == 0).count();

    let mut num = BigUint::from_bytes_be(input);
    let mut digits = Vec::new();
    while !num.is_zero() {
        let rem = &num % 58u32;
        num /= 58u32;
        // rem < 58, so the single u32 digit is always present
        let index = rem.iter_u32_digits().next().unwrap_or(0) as usize;
        digits.push(BASE58_ALPHABET[index]);
    }

    let mut encoded = vec![b'1'; zeros];
    encoded.extend(digits.iter().rev());
    // The alphabet is ASCII, so the bytes are valid UTF-8.
    String::from_utf8(encoded).unwrap_or_default()
}

/// Base58 with a 4-byte `hash256` checksum appended before encoding.
pub fn encode_base58check(payload: &[u8]) -> String {
    let checksum = hash256(payload);
    let mut checked = payload.to_vec();
    checked.extend_from_slice(&checksum[..4]);
    encode_base58(&checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn known_vectors() {
        let h1 = hex!("7c076ff316692a3d7eb3c3bb0f8b1488cf72e1afcd929e29307032997a838a3d");
        assert_eq!(
            encode_base58(&h1),
            "9MA8fRQrT4u8Zj8ZRd6MAiiyaxb2Y1CMpvVkHQu5hVM6"
        );

        let h2 = hex!("00eff69ef2b1bd93a66ed5219add4fb51e11a840f404876325a1e8ffe0529a2c");
        assert_eq!(
            encode_base58(&h2),
            "14fE3H2E6XMp4SsxtwinF7w9a34ooUrwWe4WsW1458Pd"
        );

        let h3 = hex!("c7207fee197d27c618aea621406f6bf5ef6fca38681d82b2f06fddbdce6feab6");
        assert_eq!(
            encode_base58(&h3),
            "EQJsjkd6JaGwxrjEhfeqPenqHwrBmPQZjJGNSCHBkcF7"
        );
    }

    #[test]
    fn leading_zeros_become_ones() {
        assert_eq!(encode_base58(&[0, 0, 0]), "111");
        assert_eq!(encode_base58(&[0, 0, 1]), "112");
        assert_eq!(encode_base58(&[]), "");
    }

    #[test]
    fn checksum_variant_appends_four_bytes() {
        let payload = [0x6fu8, 0xab, 0xcd];
        let checksum = hash256(&payload);
        let mut checked = payload.to_vec();
        checked.extend_from_slice(&checksum[..4]);
        assert_eq!(encode_base58check(&payload), encode_base58(&checked));
    }
}
