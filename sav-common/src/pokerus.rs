//! Pokérus status byte accessors.
//!
//! One byte per Pokémon: the high nibble carries the strain, the low nibble
//! the remaining duration in days. The games only ever spread strains whose
//! low two bits are compatible with the current duration, which is why
//! writing a duration of 12 or more rewrites the strain nibble.

use crate::{Error, Result};

/// Mask over the strain nibble.
pub const STRAIN_MASK: u8 = 0xF0;
/// Mask over the duration nibble.
pub const DURATION_MASK: u8 = 0x0F;

const MAX_DURATION: u8 = 15;

/// The four Pokérus strains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Strain {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Strain {
    fn from_low_bits(value: u8) -> Self {
        match value % 4 {
            0 => Strain::A,
            1 => Strain::B,
            2 => Strain::C,
            _ => Strain::D,
        }
    }
}

/// Read the strain encoded in a status byte.
pub fn strain(status: u8) -> Strain {
    Strain::from_low_bits((status & STRAIN_MASK) >> 4)
}

/// Write the strain, resetting the duration to the strain's initial count
/// of days (`strain % 4 + 1`), the value the game rolls on infection.
pub fn set_strain(status: &mut u8, strain: Strain) {
    let s = strain as u8;
    *status = (s << 4) | (s % 4 + 1);
}

/// Read the remaining duration in days.
pub fn duration(status: u8) -> u8 {
    status & DURATION_MASK
}

/// Write the remaining duration in days (0..=15).
///
/// Durations of 12 or more cannot coexist with every strain; the strain
/// nibble is rewritten to `(days % 4) << 4` in that case, as the games do.
/// Values above 15 are rejected and the byte is left untouched.
pub fn set_duration(status: &mut u8, days: u8) -> Result<()> {
    if days > MAX_DURATION {
        return Err(Error::ParamOutOfRange {
            what: "pokerus duration",
            value: u32::from(days),
            max: u32::from(MAX_DURATION),
        });
    }

    *status = (*status & !DURATION_MASK) | days;
    if days >= 12 {
        *status = (*status & !STRAIN_MASK) | ((days % 4) << 4);
    }
    Ok(())
}
