use bytes::BufMut;

/// Trait for types with a byte-exact wire serialization.
///
/// Unlike a self-describing format, the Bitcoin wire layout is positional:
/// every integer is emitted at a fixed width decided by the field, so the
/// impls here are the little-endian fixed-width forms the transaction
/// format uses. For encoding into a fresh buffer, use
/// [`encode_to_vec`](WireEncode::encode_to_vec).
pub trait WireEncode {
    fn encode(&self, buf: &mut dyn BufMut);

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

impl WireEncode for u8 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u8(*self);
    }
}

impl WireEncode for u16 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u16_le(*self);
    }
}

impl WireEncode for u32 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u32_le(*self);
    }
}

impl WireEncode for u64 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u64_le(*self);
    }
}

impl WireEncode for [u8] {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_slice(self);
    }
}

impl<const N: usize> WireEncode for [u8; N] {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_slice(self);
    }
}

impl WireEncode for Vec<u8> {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_slice(self);
    }
}

#[cfg(test)]
mod tests {
    use super::WireEncode;

    #[test]
    fn integers_encode_little_endian_at_fixed_width() {
        assert_eq!(3921u16.encode_to_vec(), vec![0x51, 0x0f]);
        assert_eq!(1u32.encode_to_vec(), vec![0x01, 0x00, 0x00, 0x00]);
        assert_eq!(
            1_346_134u64.encode_to_vec(),
            vec![0x56, 0x8a, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn byte_slices_pass_through() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(bytes.encode_to_vec(), bytes);
        assert_eq!([0u8; 4].encode_to_vec(), vec![0, 0, 0, 0]);
    }
}
