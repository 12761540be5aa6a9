//! Item storage: the PC and the bag pockets.
//!
//! Section 1 carries the item area as contiguous 4-byte slots (item
//! index, then count), PC first, pockets after. Bag counts are stored
//! XORed with the low half of the security key; PC counts are in the
//! clear. Pocket capacities differ per variant, so all addressing goes
//! through the capacity table.

use byteorder::{ByteOrder, LittleEndian};

use crate::offsets::{self, Section1Field};
use crate::{Error, Result, Variant};

/// Bag pockets plus the item PC, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pocket {
    Pc,
    Items,
    KeyItems,
    Balls,
    TmCase,
    Berries,
}

const POCKET_ORDER: [Pocket; 6] = [
    Pocket::Pc,
    Pocket::Items,
    Pocket::KeyItems,
    Pocket::Balls,
    Pocket::TmCase,
    Pocket::Berries,
];

/// Slot capacities, indexed by pocket then variant.
const CAPACITIES: [[usize; 3]; 6] = [
    [50, 50, 30],
    [20, 30, 42],
    [20, 30, 30],
    [16, 16, 13],
    [64, 64, 58],
    [46, 46, 43],
];

const SLOT_SIZE: usize = 4;

/// One item stack: the item index and how many are held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemSlot {
    pub id: u16,
    pub count: u16,
}

/// Slots a pocket holds under the given variant.
pub fn capacity(variant: Variant, pocket: Pocket) -> usize {
    CAPACITIES[pocket as usize][variant.index()]
}

/// Offset of a pocket's first slot within section 1's data region.
fn pocket_offset(variant: Variant, pocket: Pocket) -> usize {
    let mut offset = offsets::section1(Section1Field::ItemStorage, variant);
    for earlier in POCKET_ORDER {
        if earlier as usize == pocket as usize {
            break;
        }
        offset += capacity(variant, earlier) * SLOT_SIZE;
    }
    offset
}

/// End of the item area within section 1's data region.
#[cfg(test)]
fn storage_end(variant: Variant) -> usize {
    pocket_offset(variant, Pocket::Berries) + capacity(variant, Pocket::Berries) * SLOT_SIZE
}

/// XOR every bag count with the low half of the security key. PC counts
/// stay untouched. Involution.
pub(crate) fn crypt_bag(section1_data: &mut [u8], variant: Variant, key1: u32) {
    let key = key1 as u16;
    for pocket in POCKET_ORDER {
        if matches!(pocket, Pocket::Pc) {
            continue;
        }
        let base = pocket_offset(variant, pocket);
        for slot in 0..capacity(variant, pocket) {
            let offset = base + slot * SLOT_SIZE + 2;
            let count = LittleEndian::read_u16(&section1_data[offset..]);
            LittleEndian::write_u16(&mut section1_data[offset..], count ^ key);
        }
    }
}

fn slot_offset(variant: Variant, pocket: Pocket, index: usize) -> Result<usize> {
    let cap = capacity(variant, pocket);
    if index >= cap {
        return Err(Error::IndexOutOfRange {
            what: "item slot",
            index,
            max: cap - 1,
        });
    }
    Ok(pocket_offset(variant, pocket) + index * SLOT_SIZE)
}

/// Read one slot out of a de-obfuscated section 1.
pub(crate) fn read_slot(
    section1_data: &[u8],
    variant: Variant,
    pocket: Pocket,
    index: usize,
) -> Result<ItemSlot> {
    let offset = slot_offset(variant, pocket, index)?;
    Ok(ItemSlot {
        id: LittleEndian::read_u16(&section1_data[offset..]),
        count: LittleEndian::read_u16(&section1_data[offset + 2..]),
    })
}

/// Write one slot into a de-obfuscated section 1.
pub(crate) fn write_slot(
    section1_data: &mut [u8],
    variant: Variant,
    pocket: Pocket,
    index: usize,
    slot: ItemSlot,
) -> Result<()> {
    let offset = slot_offset(variant, pocket, index)?;
    LittleEndian::write_u16(&mut section1_data[offset..], slot.id);
    LittleEndian::write_u16(&mut section1_data[offset + 2..], slot.count);
    Ok(())
}
