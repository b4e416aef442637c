//! The signed-magnitude little-endian integer convention used by script
//! stack elements.

/// Encodes a script integer. Zero is the empty element; other values are
/// the little-endian magnitude, with the top byte's bit 7 carrying the
/// sign (padding with an extra byte when the magnitude already uses it).
pub fn encode_num(num: i64) -> Vec<u8> {
    if num == 0 {
        return Vec::new();
    }
    let negative = num < 0;
    let mut abs_num = num.unsigned_abs();

    let mut result = Vec::new();
    while abs_num > 0 {
        result.push((abs_num & 0xff) as u8);
        abs_num >>= 8;
    }

    // The invariant: bit 7 of the top byte is the sign, nothing else.
    if result.last().is_some_and(|byte| byte & 0x80 != 0) {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        if let Some(last) = result.last_mut() {
            *last |= 0x80;
        }
    }
    result
}

/// Decodes a script integer, or `None` when the element is too wide to
/// fit the script integer range.
pub fn decode_num(element: &[u8]) -> Option<i64> {
    if element.is_empty() {
        return Some(0);
    }
    if element.len() > 8 {
        return None;
    }

    let mut iter = element.iter().rev();
    // Safe: the element is non-empty.
    let top = *iter.next()?;
    let negative = top & 0x80 != 0;
    let mut result = i64::from(top & 0x7f);
    for &byte in iter {
        result = (result << 8) + i64::from(byte);
    }
    Some(if negative { -result } else { result })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_empty() {
        assert_eq!(encode_num(0), Vec::<u8>::new());
        assert_eq!(decode_num(&[]), Some(0));
    }

    #[test]
    fn small_positive_values() {
        assert_eq!(encode_num(1), vec![0x01]);
        assert_eq!(encode_num(6), vec![0x06]);
        assert_eq!(encode_num(127), vec![0x7f]);
        assert_eq!(encode_num(256), vec![0x00, 0x01]);
    }

    #[test]
    fn high_bit_forces_a_pad_byte() {
        assert_eq!(encode_num(128), vec![0x80, 0x00]);
        assert_eq!(encode_num(255), vec![0xff, 0x00]);
        assert_eq!(encode_num(32768), vec![0x00, 0x80, 0x00]);
    }

    #[test]
    fn negative_values_set_the_sign_bit() {
        assert_eq!(encode_num(-1), vec![0x81]);
        assert_eq!(encode_num(-127), vec![0xff]);
        assert_eq!(encode_num(-128), vec![0x80, 0x80]);
        assert_eq!(encode_num(-255), vec![0xff, 0x80]);
        assert_eq!(encode_num(-256), vec![0x00, 0x81]);
    }

    #[test]
    fn round_trips() {
        for value in [
            0i64, 1, -1, 6, -6, 127, -127, 128, -128, 255, -255, 256, -256, 32767, -32768,
            520, 1_000_000, -1_000_000, i64::MAX, i64::MIN + 1,
        ] {
            assert_eq!(decode_num(&encode_num(value)), Some(value), "{value}");
        }
    }

    #[test]
    fn oversized_elements_do_not_decode() {
        assert_eq!(decode_num(&[0x01; 9]), None);
        assert_eq!(decode_num(&[0x01; 8]), Some(0x0101_0101_0101_0101));
    }
}
