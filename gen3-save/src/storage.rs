//! PC box storage assembly.
//!
//! The 420 boxed records, the box names, the wallpapers, and the active
//! box index form one logical area that the format scatters over the
//! data regions of sections 5 through 13. [`BoxStorage::assemble`]
//! gathers it into a contiguous owned buffer and decrypts every record;
//! [`BoxStorage::disassemble`] re-encrypts and scatters it back. The
//! section size table must tile the area exactly, which is checked at
//! compile time.

use byteorder::{ByteOrder, LittleEndian};

use crate::pokemon::{self, BOX_RECORD_SIZE, Pokemon, PokemonMut};
use crate::sections::{SECTION_DATA_SIZES, SectionArena};
use crate::{Error, Result};

/// Boxes per save.
pub const BOX_COUNT: usize = 14;

/// Records per box.
pub const BOX_CAPACITY: usize = 30;

/// Raw byte length of a box name slot.
pub const BOX_NAME_LEN: usize = 9;

/// First logical section of the storage area.
const FIRST_SECTION: usize = 5;

/// Last logical section of the storage area.
const LAST_SECTION: usize = 13;

const RECORDS_OFFSET: usize = 4;
const RECORD_AREA: usize = BOX_COUNT * BOX_CAPACITY * BOX_RECORD_SIZE;
const NAMES_OFFSET: usize = RECORDS_OFFSET + RECORD_AREA;
const WALLPAPERS_OFFSET: usize = NAMES_OFFSET + BOX_COUNT * BOX_NAME_LEN;

/// Total bytes of the contiguous storage area.
pub const STORAGE_SIZE: usize = WALLPAPERS_OFFSET + BOX_COUNT;

const TILED_SIZE: usize = {
    let mut total = 0;
    let mut id = FIRST_SECTION;
    while id <= LAST_SECTION {
        total += SECTION_DATA_SIZES[id];
        id += 1;
    }
    total
};

// The storage sections must tile the area exactly; a mismatch is a
// format-table bug, not a runtime condition.
const _: () = assert!(TILED_SIZE == STORAGE_SIZE);

/// The PC storage system as one contiguous, decrypted area.
#[derive(Clone, Debug)]
pub struct BoxStorage {
    data: Box<[u8]>,
}

impl BoxStorage {
    /// Gather the storage area out of the logical sections and decrypt
    /// every record in place.
    pub fn assemble(arena: &SectionArena) -> Self {
        let mut data = vec![0u8; STORAGE_SIZE].into_boxed_slice();

        let mut offset = 0;
        for id in FIRST_SECTION..=LAST_SECTION {
            let chunk = arena.section_data(id);
            data[offset..offset + chunk.len()].copy_from_slice(chunk);
            offset += chunk.len();
        }

        let mut storage = Self { data };
        for index in 0..BOX_COUNT * BOX_CAPACITY {
            pokemon::decrypt(storage.record_slice_mut(index));
        }
        storage
    }

    /// Set every record's checksum, encrypt it, and scatter the area
    /// back into the logical sections.
    ///
    /// Works on a scratch copy; the decrypted state stays untouched, so
    /// saving is repeatable.
    pub fn disassemble(&self, arena: &mut SectionArena) {
        let mut scratch = self.clone();
        for index in 0..BOX_COUNT * BOX_CAPACITY {
            let record = scratch.record_slice_mut(index);
            pokemon::set_checksum(record);
            pokemon::encrypt(record);
        }

        let mut offset = 0;
        for id in FIRST_SECTION..=LAST_SECTION {
            let chunk = arena.section_data_mut(id);
            chunk.copy_from_slice(&scratch.data[offset..offset + chunk.len()]);
            offset += chunk.len();
        }
    }

    fn record_slice(&self, index: usize) -> &[u8] {
        let start = RECORDS_OFFSET + index * BOX_RECORD_SIZE;
        &self.data[start..start + BOX_RECORD_SIZE]
    }

    fn record_slice_mut(&mut self, index: usize) -> &mut [u8] {
        let start = RECORDS_OFFSET + index * BOX_RECORD_SIZE;
        &mut self.data[start..start + BOX_RECORD_SIZE]
    }

    fn record_index(box_index: usize, slot: usize) -> Result<usize> {
        if box_index >= BOX_COUNT {
            return Err(Error::IndexOutOfRange {
                what: "box",
                index: box_index,
                max: BOX_COUNT - 1,
            });
        }
        if slot >= BOX_CAPACITY {
            return Err(Error::IndexOutOfRange {
                what: "box slot",
                index: slot,
                max: BOX_CAPACITY - 1,
            });
        }
        Ok(box_index * BOX_CAPACITY + slot)
    }

    /// View of one boxed record.
    pub fn pokemon(&self, box_index: usize, slot: usize) -> Result<Pokemon<'_>> {
        let index = Self::record_index(box_index, slot)?;
        Ok(Pokemon::new(self.record_slice(index)))
    }

    /// Mutable view of one boxed record.
    pub fn pokemon_mut(&mut self, box_index: usize, slot: usize) -> Result<PokemonMut<'_>> {
        let index = Self::record_index(box_index, slot)?;
        Ok(PokemonMut::new(self.record_slice_mut(index)))
    }

    /// Index of the box open in-game.
    pub fn current_box(&self) -> u32 {
        LittleEndian::read_u32(&self.data)
    }

    /// Change which box is open in-game.
    pub fn set_current_box(&mut self, box_index: u32) -> Result<()> {
        if box_index as usize >= BOX_COUNT {
            return Err(Error::IndexOutOfRange {
                what: "box",
                index: box_index as usize,
                max: BOX_COUNT - 1,
            });
        }
        LittleEndian::write_u32(&mut self.data, box_index);
        Ok(())
    }

    /// Raw name bytes of one box.
    pub fn box_name(&self, box_index: usize) -> Result<&[u8]> {
        Self::check_box(box_index)?;
        let start = NAMES_OFFSET + box_index * BOX_NAME_LEN;
        Ok(&self.data[start..start + BOX_NAME_LEN])
    }

    /// Mutable raw name bytes of one box.
    pub fn box_name_mut(&mut self, box_index: usize) -> Result<&mut [u8]> {
        Self::check_box(box_index)?;
        let start = NAMES_OFFSET + box_index * BOX_NAME_LEN;
        Ok(&mut self.data[start..start + BOX_NAME_LEN])
    }

    /// Wallpaper index of one box.
    pub fn wallpaper(&self, box_index: usize) -> Result<u8> {
        Self::check_box(box_index)?;
        Ok(self.data[WALLPAPERS_OFFSET + box_index])
    }

    /// Change the wallpaper of one box.
    pub fn set_wallpaper(&mut self, box_index: usize, wallpaper: u8) -> Result<()> {
        Self::check_box(box_index)?;
        self.data[WALLPAPERS_OFFSET + box_index] = wallpaper;
        Ok(())
    }

    fn check_box(box_index: usize) -> Result<()> {
        if box_index >= BOX_COUNT {
            return Err(Error::IndexOutOfRange {
                what: "box",
                index: box_index,
                max: BOX_COUNT - 1,
            });
        }
        Ok(())
    }
}
