//! Security keys and the XOR obfuscation over money fields.
//!
//! The key is stored twice inside section 0 at variant-dependent offsets
//! and never derived from anything else. Money and casino coins live in
//! section 1 XORed with it; applying the transform twice restores the
//! original bytes, so load and save share the same code path.

use byteorder::{ByteOrder, LittleEndian};

use crate::Variant;
use crate::offsets::{self, COINS_FROM_MONEY, Section0Field, Section1Field};

/// The redundant pair of 32-bit obfuscation keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecurityKeys {
    pub key1: u32,
    pub key2: u32,
}

impl SecurityKeys {
    /// Read both keys out of a section-0 data region at the variant's
    /// offsets.
    pub fn read(section0_data: &[u8], variant: Variant) -> Self {
        let key1 = offsets::section0(Section0Field::SecurityKey1, variant);
        let key2 = offsets::section0(Section0Field::SecurityKey2, variant);
        Self {
            key1: LittleEndian::read_u32(&section0_data[key1..]),
            key2: LittleEndian::read_u32(&section0_data[key2..]),
        }
    }

    /// Whether the pair satisfies the variant's acceptance rule.
    pub fn valid_for(&self, variant: Variant) -> bool {
        variant.keys_match(self.key1, self.key2)
    }
}

/// XOR the money field with the key. Involution.
pub(crate) fn crypt_money(section1_data: &mut [u8], variant: Variant, key1: u32) {
    let offset = offsets::section1(Section1Field::Money, variant);
    let value = LittleEndian::read_u32(&section1_data[offset..]);
    LittleEndian::write_u32(&mut section1_data[offset..], value ^ key1);
}

/// XOR the casino coin counter with the low half of the key. Involution.
pub(crate) fn crypt_coins(section1_data: &mut [u8], variant: Variant, key1: u32) {
    let offset = offsets::section1(Section1Field::Money, variant) + COINS_FROM_MONEY;
    let value = LittleEndian::read_u16(&section1_data[offset..]);
    LittleEndian::write_u16(&mut section1_data[offset..], value ^ (key1 as u16));
}
