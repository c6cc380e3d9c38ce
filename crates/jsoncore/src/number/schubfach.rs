//! Shortest round-trip formatting of binary floating-point values.
//!
//! An implementation of Raffaello Giulietti's Schubfach algorithm: for a
//! finite value it selects the decimal with the fewest significant digits
//! that lies inside the value's rounding interval, so parsing the text back
//! yields the identical bits. When two such decimals exist the one closer to
//! the value wins, ties going to the even digit.
//!
//! Output uses computerized scientific notation. Values with a decimal
//! exponent in `-3 < e <= 7` are written plainly with at least one
//! fractional digit (`100.0`, `0.001`); everything else as `d.dddE±n`
//! (`1.0E7`, `4.9E-324`).

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

/// Range of decimal exponents covered by the `g` table.
const K_MIN: i32 = -324;
const K_MAX: i32 = 292;

const MASK_63: u64 = (1 << 63) - 1;
const MASK_32: u64 = (1 << 32) - 1;

struct Binary {
    /// Significand width including the hidden bit.
    precision: u32,
    q_min: i32,
    /// Subnormal significands below this are scaled by ten first, which keeps
    /// the interval wide enough for the digit selection.
    c_tiny: u64,
}

const DOUBLE: Binary = Binary {
    precision: 53,
    q_min: -1074,
    c_tiny: 3,
};

const FLOAT: Binary = Binary {
    precision: 24,
    q_min: -149,
    c_tiny: 8,
};

/// `floor(q * log10(2))`
#[inline]
fn flog10_pow2(q: i32) -> i32 {
    ((i64::from(q) * 661_971_961_083) >> 41) as i32
}

/// `floor(q * log10(2) + log10(3/4))`
#[inline]
fn flog10_three_quarters_pow2(q: i32) -> i32 {
    ((i64::from(q) * 661_971_961_083 - 274_743_187_321) >> 41) as i32
}

/// `floor(e * log2(10))`
#[inline]
fn flog2_pow10(e: i32) -> i32 {
    ((i64::from(e) * 913_124_641_741) >> 38) as i32
}

#[inline]
fn mul_high(a: u64, b: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) >> 64) as u64
}

/// For each `k`, the 126-bit approximation `g = floor(10^-k * 2^-r) + 1`
/// with `r` chosen so that `2^125 <= g - 1 < 2^126`, split as
/// `(g >> 63, g mod 2^63)`.
fn g_table() -> &'static [(u64, u64)] {
    static TABLE: OnceLock<Vec<(u64, u64)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let ten = BigUint::from(10u32);
        (K_MIN..=K_MAX)
            .map(|k| {
                let e = -k;
                let s = 125 - flog2_pow10(e);
                let mut num = BigUint::one();
                let mut den = BigUint::one();
                if e >= 0 {
                    num *= ten.pow(e.unsigned_abs());
                } else {
                    den *= ten.pow(e.unsigned_abs());
                }
                if s >= 0 {
                    num <<= s.unsigned_abs();
                } else {
                    den <<= s.unsigned_abs();
                }
                let g = num / den + 1u32;
                let g1 = (&g >> 63u32).to_u64().unwrap_or_default();
                let g0 = (g & BigUint::from(MASK_63)).to_u64().unwrap_or_default();
                (g1, g0)
            })
            .collect()
    })
}

#[inline]
fn g_entry(k: i32) -> (u64, u64) {
    g_table()[(k - K_MIN) as usize]
}

/// Rounds `g * cp / 2^127` to odd.
#[inline]
fn round_odd_64(g1: u64, g0: u64, cp: u64) -> u64 {
    let x1 = mul_high(g0, cp);
    let y0 = g1.wrapping_mul(cp);
    let y1 = mul_high(g1, cp);
    let z = (y0 >> 1) + x1;
    let vbp = y1 + (z >> 63);
    vbp | ((z & MASK_63) + MASK_63) >> 63
}

/// Rounds `g * cp / 2^95` to odd.
#[inline]
fn round_odd_32(g: u64, cp: u64) -> u64 {
    let x1 = mul_high(g, cp);
    let vbp = x1 >> 31;
    vbp | ((x1 & MASK_32) + MASK_32) >> 32
}

/// Scaled boundaries of the rounding interval: `(vb, vbl, vbr, k)`.
type Interval = (u64, u64, u64, i32);

fn interval_64(q: i32, c: u64, c_min: u64, q_min: i32) -> Interval {
    let cb = c << 2;
    let cbr = cb + 2;
    let (cbl, k) = if c != c_min || q == q_min {
        (cb - 2, flog10_pow2(q))
    } else {
        (cb - 1, flog10_three_quarters_pow2(q))
    };
    let h = q + flog2_pow10(-k) + 2;
    let (g1, g0) = g_entry(k);
    (
        round_odd_64(g1, g0, cb << h),
        round_odd_64(g1, g0, cbl << h),
        round_odd_64(g1, g0, cbr << h),
        k,
    )
}

fn interval_32(q: i32, c: u64, c_min: u64, q_min: i32) -> Interval {
    let cb = c << 2;
    let cbr = cb + 2;
    let (cbl, k) = if c != c_min || q == q_min {
        (cb - 2, flog10_pow2(q))
    } else {
        (cb - 1, flog10_three_quarters_pow2(q))
    };
    let h = q + flog2_pow10(-k) + 33;
    let g = g_entry(k).0 + 1;
    (
        round_odd_32(g, cb << h),
        round_odd_32(g, cbl << h),
        round_odd_32(g, cbr << h),
        k,
    )
}

/// Picks the decimal `f * 10^e` for the binary value `c * 2^q`.
fn select(
    (vb, vbl, vbr, k): Interval,
    c: u64,
    dk: i32,
    ten_floor: impl Fn(u64) -> u64,
) -> (u64, i32) {
    let out = c & 1;
    let s = vb >> 2;
    if s >= 100 {
        // Try one digit fewer first.
        let sp10 = 10 * ten_floor(s);
        let tp10 = sp10 + 10;
        let upin = vbl + out <= sp10 << 2;
        let wpin = (tp10 << 2) + out <= vbr;
        if upin != wpin {
            return (if upin { sp10 } else { tp10 }, k);
        }
    }
    let t = s + 1;
    let uin = vbl + out <= s << 2;
    let win = (t << 2) + out <= vbr;
    if uin != win {
        return (if uin { s } else { t }, k + dk);
    }
    let mid = (s + t) << 1;
    let pick_s = vb < mid || (vb == mid && s & 1 == 0);
    (if pick_s { s } else { t }, k + dk)
}

/// Shortest decimal for a finite non-zero value given by its biased exponent
/// and significand field.
fn to_decimal(
    format: &Binary,
    bq: i32,
    t: u64,
    interval: fn(i32, u64, u64, i32) -> Interval,
    ten_floor: impl Fn(u64) -> u64,
) -> (u64, i32) {
    let p = format.precision as i32;
    let c_min = 1u64 << (format.precision - 1);
    if bq != 0 {
        let mq = -format.q_min + 1 - bq;
        let c = c_min | t;
        // Integers below 2^p need no search.
        if 0 < mq && mq < p {
            let f = c >> mq;
            if f << mq == c {
                return (f, 0);
            }
        }
        let q = -mq;
        return select(interval(q, c, c_min, format.q_min), c, 0, ten_floor);
    }
    if t < format.c_tiny {
        let c = 10 * t;
        select(interval(format.q_min, c, c_min, format.q_min), c, -1, ten_floor)
    } else {
        select(interval(format.q_min, t, c_min, format.q_min), t, 0, ten_floor)
    }
}

/// Writes `f * 10^e` in computerized scientific notation.
fn write_decimal(f: u64, e: i32, negative: bool, out: &mut Vec<u8>) {
    let mut buf = [0u8; 20];
    let mut start = buf.len();
    let mut n = f;
    loop {
        start -= 1;
        buf[start] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    let all = &buf[start..];
    let mut end = all.len();
    while end > 1 && all[end - 1] == b'0' {
        end -= 1;
    }
    let digits = &all[..end];
    // Exponent of the value written as 0.ddd.
    let e = e + all.len() as i32;

    if negative {
        out.push(b'-');
    }
    if 0 < e && e <= 7 {
        let int_len = e as usize;
        if digits.len() > int_len {
            out.extend_from_slice(&digits[..int_len]);
            out.push(b'.');
            out.extend_from_slice(&digits[int_len..]);
        } else {
            out.extend_from_slice(digits);
            out.resize(out.len() + int_len - digits.len(), b'0');
            out.extend_from_slice(b".0");
        }
    } else if -3 < e && e <= 0 {
        out.extend_from_slice(b"0.");
        out.resize(out.len() + e.unsigned_abs() as usize, b'0');
        out.extend_from_slice(digits);
    } else {
        out.push(digits[0]);
        out.push(b'.');
        if digits.len() > 1 {
            out.extend_from_slice(&digits[1..]);
        } else {
            out.push(b'0');
        }
        out.push(b'E');
        let exp = e - 1;
        if exp < 0 {
            out.push(b'-');
        }
        super::write::write_int(exp.abs(), out);
    }
}

/// Appends the shortest round-trip text of `v`.
pub fn write_double(v: f64, out: &mut Vec<u8>) {
    const T_MASK: u64 = (1 << 52) - 1;
    const BQ_MASK: u64 = (1 << 11) - 1;

    let bits = v.to_bits();
    let t = bits & T_MASK;
    let bq = (bits >> 52) & BQ_MASK;
    let negative = bits >> 63 != 0;
    if bq == BQ_MASK {
        out.extend_from_slice(match (t != 0, negative) {
            (true, _) => b"NaN".as_slice(),
            (false, false) => b"Infinity".as_slice(),
            (false, true) => b"-Infinity".as_slice(),
        });
        return;
    }
    if bq == 0 && t == 0 {
        out.extend_from_slice(if negative { b"-0.0".as_slice() } else { b"0.0" });
        return;
    }
    let (f, e) = to_decimal(&DOUBLE, bq as i32, t, interval_64, |s| {
        mul_high(s, 115_292_150_460_684_698 << 4)
    });
    write_decimal(f, e, negative, out);
}

/// Appends the shortest round-trip text of `v` as an `f32`.
pub fn write_float(v: f32, out: &mut Vec<u8>) {
    const T_MASK: u32 = (1 << 23) - 1;
    const BQ_MASK: u32 = (1 << 8) - 1;

    let bits = v.to_bits();
    let t = bits & T_MASK;
    let bq = (bits >> 23) & BQ_MASK;
    let negative = bits >> 31 != 0;
    if bq == BQ_MASK {
        out.extend_from_slice(match (t != 0, negative) {
            (true, _) => b"NaN".as_slice(),
            (false, false) => b"Infinity".as_slice(),
            (false, true) => b"-Infinity".as_slice(),
        });
        return;
    }
    if bq == 0 && t == 0 {
        out.extend_from_slice(if negative { b"-0.0".as_slice() } else { b"0.0" });
        return;
    }
    let (f, e) = to_decimal(&FLOAT, bq as i32, u64::from(t), interval_32, |s| {
        (s * 1_717_986_919) >> 34
    });
    write_decimal(f, e, negative, out);
}

/// Returns the shortest round-trip text of `v`.
#[must_use]
pub fn double_to_string(v: f64) -> String {
    let mut out = Vec::with_capacity(24);
    write_double(v, &mut out);
    super::write::ascii_to_string(out)
}

/// Returns the shortest round-trip text of `v`.
#[must_use]
pub fn float_to_string(v: f32) -> String {
    let mut out = Vec::with_capacity(16);
    write_float(v, &mut out);
    super::write::ascii_to_string(out)
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, "0.0")]
    #[case(-0.0, "-0.0")]
    #[case(1.0, "1.0")]
    #[case(-1.5, "-1.5")]
    #[case(0.1, "0.1")]
    #[case(100.0, "100.0")]
    #[case(123.456, "123.456")]
    #[case(0.001, "0.001")]
    #[case(0.0001, "1.0E-4")]
    #[case(9_999_999.0, "9999999.0")]
    #[case(1.0e7, "1.0E7")]
    #[case(1.0e23, "1.0E23")]
    #[case(9_007_199_254_740_992.0, "9.007199254740992E15")]
    #[case(f64::MAX, "1.7976931348623157E308")]
    #[case(f64::MIN_POSITIVE, "2.2250738585072014E-308")]
    #[case(5e-324, "4.9E-324")]
    #[case(f64::NAN, "NaN")]
    #[case(f64::INFINITY, "Infinity")]
    #[case(f64::NEG_INFINITY, "-Infinity")]
    fn doubles(#[case] v: f64, #[case] expected: &str) {
        assert_eq!(double_to_string(v), expected);
    }

    #[rstest]
    #[case(1.0, "1.0")]
    #[case(0.1, "0.1")]
    #[case(f32::MAX, "3.4028235E38")]
    #[case(f32::from_bits(1), "1.4E-45")]
    #[case(-0.0, "-0.0")]
    fn floats(#[case] v: f32, #[case] expected: &str) {
        assert_eq!(float_to_string(v), expected);
    }

    #[test]
    fn table_edges() {
        // k = 0 is exactly 2^125, plus one.
        assert_eq!(g_entry(0), (1 << 62, 1));
        for &(g1, _) in g_table() {
            assert!(g1 >= 1 << 62 && g1 < 1 << 63);
        }
    }

    #[quickcheck]
    fn doubles_round_trip(bits: u64) -> bool {
        let v = f64::from_bits(bits);
        if !v.is_finite() {
            return true;
        }
        double_to_string(v).parse::<f64>().map(f64::to_bits) == Ok(bits)
    }

    #[quickcheck]
    fn floats_round_trip(bits: u32) -> bool {
        let v = f32::from_bits(bits);
        if !v.is_finite() {
            return true;
        }
        float_to_string(v).parse::<f32>().map(f32::to_bits) == Ok(bits)
    }

    #[test]
    fn subnormals_round_trip() {
        for bits in [1u64, 2, 3, 4, 0x000f_ffff_ffff_ffff, 0x0010_0000_0000_0000] {
            let v = f64::from_bits(bits);
            assert_eq!(double_to_string(v).parse::<f64>().unwrap().to_bits(), bits);
        }
        for bits in [1u32, 7, 8, 0x007f_ffff] {
            let v = f32::from_bits(bits);
            assert_eq!(float_to_string(v).parse::<f32>().unwrap().to_bits(), bits);
        }
    }
}
