//! Per-variant field offset tables.
//!
//! Fields that move between variants are addressed through 2-D constant
//! tables indexed by field then variant (Ruby/Sapphire, Emerald,
//! FireRed/LeafGreen). Fields a variant does not carry use an explicit
//! `Option`, never a sentinel offset. Offsets are relative to the start
//! of the carrier section's data region.

use crate::Variant;

/// Fields carried by logical section 0 at variant-dependent offsets.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Section0Field {
    /// National dex unlock byte A.
    NatDexMagicA = 0,
    /// Owned-species flag bitmap.
    DexOwned,
    /// First copy of the seen-species flag bitmap.
    DexSeenA,
    /// First copy of the security key.
    SecurityKey1,
    /// Second copy of the security key.
    SecurityKey2,
}

const SECTION0: [[usize; 3]; 5] = [
    [0x019, 0x019, 0x01B],
    [0x028, 0x028, 0x028],
    [0x05C, 0x05C, 0x05C],
    [0x0AC, 0x0AC, 0x1F4],
    [0x0AC, 0xAF8, 0xF20],
];

pub(crate) fn section0(field: Section0Field, variant: Variant) -> usize {
    SECTION0[field as usize][variant.index()]
}

/// Fields carried by logical section 1.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Section1Field {
    /// Party count followed by the six party records.
    Party = 0,
    /// Money, stored XORed with the security key.
    Money,
    /// Item PC and bag pockets.
    ItemStorage,
    /// Second copy of the seen-species flag bitmap.
    DexSeenB,
}

const SECTION1: [[usize; 3]; 4] = [
    [0x234, 0x234, 0x034],
    [0x490, 0x490, 0x290],
    [0x498, 0x498, 0x298],
    [0x938, 0x988, 0x5F8],
];

pub(crate) fn section1(field: Section1Field, variant: Variant) -> usize {
    SECTION1[field as usize][variant.index()]
}

/// Fields carried by logical section 2.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Section2Field {
    /// National dex unlock bit B.
    NatDexMagicB = 0,
    /// National dex unlock halfword C.
    NatDexMagicC,
}

const SECTION2: [[usize; 3]; 2] = [
    [0x3A6, 0x402, 0x068],
    [0x44C, 0x4A8, 0x11C],
];

pub(crate) fn section2(field: Section2Field, variant: Variant) -> usize {
    SECTION2[field as usize][variant.index()]
}

/// Fields carried by logical section 4.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Section4Field {
    /// Third copy of the seen-species flag bitmap.
    DexSeenC = 0,
}

const SECTION4: [[usize; 3]; 1] = [[0xC0C, 0xCA4, 0xB98]];

pub(crate) fn section4(field: Section4Field, variant: Variant) -> usize {
    SECTION4[field as usize][variant.index()]
}

/// Rival name in section 4. FireRed/LeafGreen only.
const RIVAL_NAME: [Option<usize>; 3] = [None, None, Some(0xBCC)];

pub(crate) fn rival_name(variant: Variant) -> Option<usize> {
    RIVAL_NAME[variant.index()]
}

/// Badge bits inside section 2: halfword offset and the bit position of
/// the first badge within it.
const BADGES: [(usize, u32); 3] = [(0x3A0, 7), (0x3FC, 7), (0x064, 0)];

pub(crate) fn badges(variant: Variant) -> (usize, u32) {
    BADGES[variant.index()]
}

/// Values marking the national dex as unlocked.
pub(crate) const NAT_DEX_MAGIC_A: [u8; 3] = [0xDA, 0xDA, 0xB9];
pub(crate) const NAT_DEX_MAGIC_B: [u8; 3] = [0x40, 0x40, 0x01];
pub(crate) const NAT_DEX_MAGIC_C: [u16; 3] = [0x0302, 0x0302, 0x6258];

/// Casino coins sit right behind the money field.
pub(crate) const COINS_FROM_MONEY: usize = 4;

// Trainer fields at the head of section 0 sit at the same offsets in
// every variant.
pub(crate) const TRAINER_NAME: usize = 0x00;
pub(crate) const TRAINER_NAME_LEN: usize = 7;
pub(crate) const TRAINER_GENDER: usize = 0x08;
pub(crate) const TRAINER_ID: usize = 0x0A;
pub(crate) const TIME_PLAYED_HOURS: usize = 0x0E;
pub(crate) const TIME_PLAYED_MINUTES: usize = 0x10;
pub(crate) const TIME_PLAYED_SECONDS: usize = 0x11;
pub(crate) const TIME_PLAYED_FRAMES: usize = 0x12;
pub(crate) const OPTIONS_BUTTON_MODE: usize = 0x13;
pub(crate) const OPTIONS_TEXT: usize = 0x14;
pub(crate) const OPTIONS_SOUND_BATTLE: usize = 0x15;

pub(crate) const RIVAL_NAME_LEN: usize = 7;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::SECTION_DATA_SIZES;

    const VARIANTS: [Variant; 3] = [
        Variant::RubySapphire,
        Variant::Emerald,
        Variant::FireRedLeafGreen,
    ];

    #[test]
    fn section0_offsets_fit_the_data_region() {
        // Key fields are 4 bytes wide; the widest read must stay inside.
        for variant in VARIANTS {
            for field in [
                Section0Field::NatDexMagicA,
                Section0Field::DexOwned,
                Section0Field::DexSeenA,
                Section0Field::SecurityKey1,
                Section0Field::SecurityKey2,
            ] {
                assert!(section0(field, variant) + 4 <= SECTION_DATA_SIZES[0]);
            }
        }
    }

    #[test]
    fn section1_offsets_fit_the_data_region() {
        for variant in VARIANTS {
            for field in [
                Section1Field::Party,
                Section1Field::Money,
                Section1Field::ItemStorage,
                Section1Field::DexSeenB,
            ] {
                assert!(section1(field, variant) < SECTION_DATA_SIZES[1]);
            }
        }
    }

    #[test]
    fn section2_and_4_offsets_fit_their_data_regions() {
        for variant in VARIANTS {
            assert!(section2(Section2Field::NatDexMagicB, variant) < SECTION_DATA_SIZES[2]);
            assert!(section2(Section2Field::NatDexMagicC, variant) + 2 <= SECTION_DATA_SIZES[2]);
            assert!(badges(variant).0 + 2 <= SECTION_DATA_SIZES[2]);
            assert!(section4(Section4Field::DexSeenC, variant) < SECTION_DATA_SIZES[4]);
        }
    }

    #[test]
    fn rival_name_is_firered_leafgreen_only() {
        assert_eq!(rival_name(Variant::RubySapphire), None);
        assert_eq!(rival_name(Variant::Emerald), None);
        let offset = rival_name(Variant::FireRedLeafGreen).unwrap();
        assert!(offset + RIVAL_NAME_LEN <= SECTION_DATA_SIZES[4]);
    }

    #[test]
    fn keyless_variant_reads_both_keys_from_one_offset() {
        // Ruby/Sapphire carries no key; both reads land on the same word,
        // which detection then requires to be zero.
        assert_eq!(
            section0(Section0Field::SecurityKey1, Variant::RubySapphire),
            section0(Section0Field::SecurityKey2, Variant::RubySapphire),
        );
    }
}
