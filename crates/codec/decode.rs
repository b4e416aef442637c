use crate::error::CodecError;

/// Trait for decoding a value from its byte-exact wire form.
///
/// [`decode_unfinished`](WireDecode::decode_unfinished) consumes the
/// value's bytes from the front of the slice and returns the value along
/// with the remaining bytes, so callers can chain fields the way the wire
/// layout chains them. [`decode`](WireDecode::decode) additionally
/// requires the whole input to be consumed.
pub trait WireDecode: Sized {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError>;

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let (decoded, remaining) = Self::decode_unfinished(buf)?;
        if !remaining.is_empty() {
            return Err(CodecError::trailing_bytes());
        }
        Ok(decoded)
    }
}

/// Splits `n` bytes off the front of `buf`, or fails with `UnexpectedEof`.
pub fn read_bytes(buf: &[u8], n: usize) -> Result<(&[u8], &[u8]), CodecError> {
    if buf.len() < n {
        return Err(CodecError::unexpected_eof());
    }
    Ok(buf.split_at(n))
}

/// Reads a fixed-size array off the front of `buf`.
pub fn read_array<const N: usize>(buf: &[u8]) -> Result<([u8; N], &[u8]), CodecError> {
    let (bytes, rest) = read_bytes(buf, N)?;
    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    Ok((array, rest))
}

pub fn read_u8(buf: &[u8]) -> Result<(u8, &[u8]), CodecError> {
    let (bytes, rest) = read_array::<1>(buf)?;
    Ok((bytes[0], rest))
}

pub fn read_u16_le(buf: &[u8]) -> Result<(u16, &[u8]), CodecError> {
    let (bytes, rest) = read_array::<2>(buf)?;
    Ok((u16::from_le_bytes(bytes), rest))
}

pub fn read_u32_le(buf: &[u8]) -> Result<(u32, &[u8]), CodecError> {
    let (bytes, rest) = read_array::<4>(buf)?;
    Ok((u32::from_le_bytes(bytes), rest))
}

pub fn read_u64_le(buf: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    let (bytes, rest) = read_array::<8>(buf)?;
    Ok((u64::from_le_bytes(bytes), rest))
}

pub fn read_u16_be(buf: &[u8]) -> Result<(u16, &[u8]), CodecError> {
    let (bytes, rest) = read_array::<2>(buf)?;
    Ok((u16::from_be_bytes(bytes), rest))
}

pub fn read_u32_be(buf: &[u8]) -> Result<(u32, &[u8]), CodecError> {
    let (bytes, rest) = read_array::<4>(buf)?;
    Ok((u32::from_be_bytes(bytes), rest))
}

pub fn read_u64_be(buf: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    let (bytes, rest) = read_array::<8>(buf)?;
    Ok((u64::from_be_bytes(bytes), rest))
}

impl WireDecode for u8 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        read_u8(buf)
    }
}

impl WireDecode for u16 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        read_u16_le(buf)
    }
}

impl WireDecode for u32 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        read_u32_le(buf)
    }
}

impl WireDecode for u64 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        read_u64_le(buf)
    }
}

impl<const N: usize> WireDecode for [u8; N] {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        read_array::<N>(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_readers_round_trip() {
        let (value, rest) = read_u16_le(&[0x87, 0x4d, 0xff]).unwrap();
        assert_eq!(value, 19847);
        assert_eq!(rest, &[0xff]);

        let (value, rest) = read_u32_le(&[0x7f, 0x11, 0x01, 0x00]).unwrap();
        assert_eq!(value, 70015);
        assert!(rest.is_empty());

        let (value, _) = read_u64_le(&[0xeb, 0x16, 0xc1, 0xf5, 0x8d, 0, 0, 0]).unwrap();
        assert_eq!(value, 609_713_460_971);
    }

    #[test]
    fn big_endian_readers() {
        let (value, _) = read_u32_be(&[0x00, 0x01, 0x11, 0x7f]).unwrap();
        assert_eq!(value, 70015);
        let (value, _) = read_u16_be(&[0x4d, 0x87]).unwrap();
        assert_eq!(value, 19847);
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert_eq!(read_u32_le(&[0x01, 0x02]), Err(CodecError::unexpected_eof()));
        assert_eq!(read_bytes(&[], 1), Err(CodecError::unexpected_eof()));
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        assert_eq!(
            u16::decode(&[0x01, 0x00, 0xff]),
            Err(CodecError::trailing_bytes())
        );
        assert_eq!(u16::decode(&[0x01, 0x00]), Ok(1));
    }
}
