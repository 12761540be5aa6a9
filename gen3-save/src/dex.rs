//! Pokédex flag storage.
//!
//! Owned flags live once in section 0; seen flags are kept three times
//! (sections 0, 1, and 4) and the game cross-checks the copies, so every
//! write goes to all three. The national dex unlock is a trio of magic
//! fields spread over sections 0 and 2.

use byteorder::{ByteOrder, LittleEndian};

use sav_common::pokedex;

use crate::Result;
use crate::Variant;
use crate::offsets::{self, Section0Field, Section1Field, Section2Field, Section4Field};
use crate::sections::SectionArena;

/// Bytes per flag bitmap: one bit for each of the 386 species, rounded
/// up to whole bytes.
pub(crate) const DEX_FLAG_BYTES: usize = 49;

fn seen_copies(variant: Variant) -> [(usize, usize); 3] {
    [
        (0, offsets::section0(Section0Field::DexSeenA, variant)),
        (1, offsets::section1(Section1Field::DexSeenB, variant)),
        (4, offsets::section4(Section4Field::DexSeenC, variant)),
    ]
}

pub(crate) fn owned(arena: &SectionArena, variant: Variant, national_id: u16) -> Result<bool> {
    let offset = offsets::section0(Section0Field::DexOwned, variant);
    let flags = &arena.section_data(0)[offset..offset + DEX_FLAG_BYTES];
    Ok(pokedex::get_bit(flags, national_id)?)
}

pub(crate) fn set_owned(
    arena: &mut SectionArena,
    variant: Variant,
    national_id: u16,
    owned: bool,
) -> Result<()> {
    let offset = offsets::section0(Section0Field::DexOwned, variant);
    let flags = &mut arena.section_data_mut(0)[offset..offset + DEX_FLAG_BYTES];
    Ok(pokedex::set_bit(flags, national_id, owned)?)
}

pub(crate) fn seen(arena: &SectionArena, variant: Variant, national_id: u16) -> Result<bool> {
    let (section, offset) = seen_copies(variant)[0];
    let flags = &arena.section_data(section)[offset..offset + DEX_FLAG_BYTES];
    Ok(pokedex::get_bit(flags, national_id)?)
}

/// Seen flags update all three redundant copies in one go.
pub(crate) fn set_seen(
    arena: &mut SectionArena,
    variant: Variant,
    national_id: u16,
    seen: bool,
) -> Result<()> {
    for (section, offset) in seen_copies(variant) {
        let flags = &mut arena.section_data_mut(section)[offset..offset + DEX_FLAG_BYTES];
        pokedex::set_bit(flags, national_id, seen)?;
    }
    Ok(())
}

pub(crate) fn national_dex_unlocked(arena: &SectionArena, variant: Variant) -> bool {
    let idx = variant.index();
    let a = arena.section_data(0)[offsets::section0(Section0Field::NatDexMagicA, variant)];
    let b = arena.section_data(2)[offsets::section2(Section2Field::NatDexMagicB, variant)];
    let c = LittleEndian::read_u16(
        &arena.section_data(2)[offsets::section2(Section2Field::NatDexMagicC, variant)..],
    );

    a == offsets::NAT_DEX_MAGIC_A[idx]
        && b & offsets::NAT_DEX_MAGIC_B[idx] != 0
        && c == offsets::NAT_DEX_MAGIC_C[idx]
}

pub(crate) fn set_national_dex_unlocked(
    arena: &mut SectionArena,
    variant: Variant,
    unlocked: bool,
) {
    let idx = variant.index();

    let a_offset = offsets::section0(Section0Field::NatDexMagicA, variant);
    arena.section_data_mut(0)[a_offset] = if unlocked {
        offsets::NAT_DEX_MAGIC_A[idx]
    } else {
        0
    };

    let b_offset = offsets::section2(Section2Field::NatDexMagicB, variant);
    let c_offset = offsets::section2(Section2Field::NatDexMagicC, variant);
    let section2 = arena.section_data_mut(2);
    if unlocked {
        section2[b_offset] |= offsets::NAT_DEX_MAGIC_B[idx];
        LittleEndian::write_u16(&mut section2[c_offset..], offsets::NAT_DEX_MAGIC_C[idx]);
    } else {
        section2[b_offset] &= !offsets::NAT_DEX_MAGIC_B[idx];
        LittleEndian::write_u16(&mut section2[c_offset..], 0);
    }
}
