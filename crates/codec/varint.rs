//! Bitcoin's self-delimiting unsigned integer framing.
//!
//! Values below `0xfd` are a single byte. Larger values carry a one-byte
//! marker followed by the value at the next fixed width, little-endian:
//! `0xfd` + u16, `0xfe` + u32, `0xff` + u64.

use bytes::BufMut;

use crate::decode::{read_u8, read_u16_le, read_u32_le, read_u64_le};
use crate::error::CodecError;

/// Reads a varint off the front of `buf`, returning the value and the rest.
pub fn read_varint(buf: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    let (marker, rest) = read_u8(buf)?;
    match marker {
        0xfd => {
            let (value, rest) = read_u16_le(rest)?;
            Ok((u64::from(value), rest))
        }
        0xfe => {
            let (value, rest) = read_u32_le(rest)?;
            Ok((u64::from(value), rest))
        }
        0xff => read_u64_le(rest),
        value => Ok((u64::from(value), rest)),
    }
}

/// Encodes `value` with the shortest varint framing.
pub fn write_varint(value: u64, buf: &mut dyn BufMut) {
    if value < 0xfd {
        buf.put_u8(value as u8);
    } else if value <= 0xffff {
        buf.put_u8(0xfd);
        buf.put_u16_le(value as u16);
    } else if value <= 0xffff_ffff {
        buf.put_u8(0xfe);
        buf.put_u32_le(value as u32);
    } else {
        buf.put_u8(0xff);
        buf.put_u64_le(value);
    }
}

/// Checked variant accepting an arbitrary-width value. Anything at or
/// above `2^64` has no varint form and fails with `VarintOverflow`.
pub fn write_varint_checked(value: u128, buf: &mut dyn BufMut) -> Result<(), CodecError> {
    let value = u64::try_from(value).map_err(|_| CodecError::VarintOverflow(value))?;
    write_varint(value, buf);
    Ok(())
}

/// Encoded length in bytes of `value`'s varint form.
pub const fn varint_len(value: u64) -> usize {
    if value < 0xfd {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint(value, &mut buf);
        buf
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(encode(100), vec![0x64]);
        assert_eq!(read_varint(&[0x64]).unwrap(), (100, &[][..]));
    }

    #[test]
    fn two_byte_values() {
        assert_eq!(encode(255), vec![0xfd, 0xff, 0x00]);
        assert_eq!(encode(555), vec![0xfd, 0x2b, 0x02]);
        assert_eq!(read_varint(&[0xfd, 0x2b, 0x02]).unwrap().0, 555);
    }

    #[test]
    fn four_byte_values() {
        assert_eq!(encode(70015), vec![0xfe, 0x7f, 0x11, 0x01, 0x00]);
        assert_eq!(read_varint(&[0xfe, 0x7f, 0x11, 0x01, 0x00]).unwrap().0, 70015);
    }

    #[test]
    fn eight_byte_values() {
        let expected = vec![0xff, 0x6d, 0xc7, 0xed, 0x3e, 0x60, 0x10, 0x00, 0x00];
        assert_eq!(encode(18_005_558_675_309), expected);
        assert_eq!(read_varint(&expected).unwrap().0, 18_005_558_675_309);
    }

    #[test]
    fn boundary_values_round_trip() {
        for value in [
            0u64,
            0xfc,
            0xfd,
            0xffff,
            0x10000,
            0xffff_ffff,
            0x1_0000_0000,
            u64::MAX,
        ] {
            let encoded = encode(value);
            assert_eq!(encoded.len(), varint_len(value));
            let (decoded, rest) = read_varint(&encoded).unwrap();
            assert_eq!(decoded, value);
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn value_past_u64_overflows() {
        let mut buf = Vec::new();
        assert_eq!(
            write_varint_checked(1u128 << 64, &mut buf),
            Err(CodecError::VarintOverflow(1u128 << 64))
        );
        assert!(write_varint_checked(u64::MAX as u128, &mut buf).is_ok());
    }

    #[test]
    fn truncated_payload_is_an_error() {
        assert_eq!(read_varint(&[0xfd, 0x2b]), Err(CodecError::unexpected_eof()));
        assert_eq!(read_varint(&[]), Err(CodecError::unexpected_eof()));
    }
}
