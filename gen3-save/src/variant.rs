//! Game variant classification.

use std::fmt;

/// The three cartridge families sharing the Generation III save layout.
///
/// The variant selects which per-field offset table applies and how the
/// redundant security-key pair is interpreted. It is fixed at detection
/// time and never changes over the life of a loaded save.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    RubySapphire,
    Emerald,
    FireRedLeafGreen,
}

impl Variant {
    /// Detection tries the variants in this fixed order.
    pub(crate) const TRIAL_ORDER: [Variant; 3] = [
        Variant::RubySapphire,
        Variant::Emerald,
        Variant::FireRedLeafGreen,
    ];

    /// Column of this variant in the offset tables.
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Whether a redundant key pair read at this variant's offsets is
    /// acceptable. Ruby/Sapphire carries no key, so both reads must be
    /// zero; the other variants only require the two copies to agree.
    pub(crate) fn keys_match(self, key1: u32, key2: u32) -> bool {
        match self {
            Variant::RubySapphire => key1 == key2 && key1 == 0,
            Variant::Emerald | Variant::FireRedLeafGreen => key1 == key2,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::RubySapphire => "Ruby/Sapphire",
            Variant::Emerald => "Emerald",
            Variant::FireRedLeafGreen => "FireRed/LeafGreen",
        };
        f.write_str(name)
    }
}
