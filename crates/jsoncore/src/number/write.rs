//! Integer output, three digits at a time.

#![allow(clippy::cast_possible_truncation)]

/// Each entry packs the three ASCII digits of its index (zero-padded) in the
/// low 24 bits and the count of leading zeros in the top byte.
static TRIPLETS: [u32; 1000] = build_triplets();

const fn build_triplets() -> [u32; 1000] {
    let mut table = [0u32; 1000];
    let mut i = 0;
    while i < 1000 {
        let d1 = (i / 100) as u32;
        let d2 = ((i / 10) % 10) as u32;
        let d3 = (i % 10) as u32;
        let lead = if d1 != 0 {
            0
        } else if d2 != 0 {
            1
        } else {
            2
        };
        table[i] = (lead << 24) | ((d1 + b'0' as u32) << 16) | ((d2 + b'0' as u32) << 8) | (d3 + b'0' as u32);
        i += 1;
    }
    table
}

const MIN_INT_TEXT: &[u8] = b"-2147483648";
const MIN_LONG_TEXT: &[u8] = b"-9223372036854775808";
const BILLION: u64 = 1_000_000_000;

#[inline]
fn full_triplet(out: &mut Vec<u8>, t: u32) {
    let packed = TRIPLETS[t as usize];
    out.extend_from_slice(&[(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]);
}

/// Writes `0..1000` without leading zeros.
#[inline]
fn leading_triplet(out: &mut Vec<u8>, t: u32) {
    let packed = TRIPLETS[t as usize];
    let lead = (packed >> 24) as usize;
    let bytes = [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8];
    out.extend_from_slice(&bytes[lead..]);
}

/// Writes `0..1_000_000_000`, `full` forcing all nine digits.
fn write_nine(out: &mut Vec<u8>, v: u32, full: bool) {
    let hi = v / 1_000_000;
    let mid = (v / 1000) % 1000;
    let lo = v % 1000;
    if full {
        full_triplet(out, hi);
        full_triplet(out, mid);
        full_triplet(out, lo);
    } else if hi != 0 {
        leading_triplet(out, hi);
        full_triplet(out, mid);
        full_triplet(out, lo);
    } else if mid != 0 {
        leading_triplet(out, mid);
        full_triplet(out, lo);
    } else {
        leading_triplet(out, lo);
    }
}

/// Appends the decimal text of `v`.
pub fn write_int(v: i32, out: &mut Vec<u8>) {
    if v == i32::MIN {
        out.extend_from_slice(MIN_INT_TEXT);
        return;
    }
    if v < 0 {
        out.push(b'-');
    }
    let mut n = v.unsigned_abs();
    if n >= BILLION as u32 {
        let top = n / BILLION as u32;
        n -= top * BILLION as u32;
        leading_triplet(out, top);
        write_nine(out, n, true);
    } else {
        write_nine(out, n, false);
    }
}

/// Appends the decimal text of `v`.
pub fn write_long(v: i64, out: &mut Vec<u8>) {
    if v == i64::MIN {
        out.extend_from_slice(MIN_LONG_TEXT);
        return;
    }
    if v < 0 {
        out.push(b'-');
    }
    let n = v.unsigned_abs();
    if n < BILLION {
        write_nine(out, n as u32, false);
        return;
    }
    let low = (n % BILLION) as u32;
    let upper = n / BILLION;
    if upper < BILLION {
        write_nine(out, upper as u32, false);
    } else {
        // At most 10 digits remain above the lowest nine.
        let top = (upper / BILLION) as u32;
        leading_triplet(out, top);
        write_nine(out, (upper % BILLION) as u32, true);
    }
    write_nine(out, low, true);
}

/// Returns the decimal text of `v`.
#[must_use]
pub fn int_to_string(v: i32) -> String {
    let mut out = Vec::with_capacity(11);
    write_int(v, &mut out);
    ascii_to_string(out)
}

/// Returns the decimal text of `v`.
#[must_use]
pub fn long_to_string(v: i64) -> String {
    let mut out = Vec::with_capacity(20);
    write_long(v, &mut out);
    ascii_to_string(out)
}

pub(crate) fn ascii_to_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_default()
}
