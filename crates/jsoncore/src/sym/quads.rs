use smallvec::SmallVec;

/// Quad buffer sized for names up to 32 bytes without spilling to the heap.
pub type Quads = SmallVec<[u32; 8]>;

/// Packs up to four bytes big-endian, padding with zeros.
#[inline]
#[must_use]
pub fn pack_quad(bytes: &[u8]) -> u32 {
    debug_assert!(bytes.len() <= 4);
    let mut buf = [0u8; 4];
    buf[..bytes.len()].copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

/// Packs `bytes` into quads.
#[must_use]
pub fn pack_quads(bytes: &[u8]) -> Quads {
    let mut out = Quads::with_capacity(quad_count(bytes.len()));
    pack_into(bytes, &mut out);
    out
}

/// Replaces the contents of `out` with the quads of `bytes`.
pub fn pack_into(bytes: &[u8], out: &mut Quads) {
    out.clear();
    out.extend(bytes.chunks(4).map(pack_quad));
}

/// Number of quads needed for `byte_len` bytes.
#[inline]
#[must_use]
pub const fn quad_count(byte_len: usize) -> usize {
    byte_len.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_big_endian_with_padding() {
        assert_eq!(pack_quad(b"abcd"), 0x6162_6364);
        assert_eq!(pack_quad(b"a"), 0x6100_0000);
        assert_eq!(pack_quads(b"abcdef").as_slice(), &[0x6162_6364, 0x6566_0000]);
        assert!(pack_quads(b"").is_empty());
        // Trailing NUL bytes pack identically; the tables compare lengths too.
        assert_eq!(pack_quads(b"a"), pack_quads(b"a\0"));
    }
}
