//! Packed binary-coded-decimal numbers.
//!
//! The Game Boy titles store money and coin counts as packed BCD: two
//! decimal digits per byte, most significant pair first. A three-byte field
//! therefore holds 0..=999999.

/// Decode a packed BCD buffer into a plain integer.
///
/// Nibbles above 9 are taken at face value, matching what the games
/// themselves do with corrupted digits.
pub fn decode(buf: &[u8]) -> u32 {
    buf.iter().fold(0u32, |acc, &b| {
        acc.wrapping_mul(100)
            .wrapping_add(u32::from(b >> 4) * 10 + u32::from(b & 0x0F))
    })
}

/// Encode `value` as packed BCD into `out`, most significant pair first.
///
/// Values with more decimal digits than `out` can hold saturate to
/// all-nines, the maximum the field can represent.
pub fn encode(value: u32, out: &mut [u8]) {
    let mut rest = value;
    for byte in out.iter_mut().rev() {
        let pair = rest % 100;
        *byte = (((pair / 10) << 4) | (pair % 10)) as u8;
        rest /= 100;
    }
    if rest > 0 {
        out.fill(0x99);
    }
}
