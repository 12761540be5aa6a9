//! Physical sections, footers, and the shuffle between on-disk and
//! logical order.
//!
//! A save bank is 14 sections of 0x1000 bytes. Each section ends in a
//! 12-byte footer naming its logical id; the game rotates which physical
//! slot holds which id between saves, so the on-disk order says nothing
//! about a section's role. [`SectionArena::unshuffle`] restores logical
//! order and records the physical arrangement so that
//! [`SectionArena::shuffle_into`] can put every section back where the
//! game left it.

use tracing::{debug, warn};

use crate::{Error, Result};

/// Sections per save bank.
pub const SECTION_COUNT: usize = 14;

/// Bytes per section, footer included.
pub const SECTION_SIZE: usize = 0x1000;

/// Bytes per section footer.
pub const FOOTER_SIZE: usize = 12;

/// Offset of the footer within a section.
pub const FOOTER_OFFSET: usize = SECTION_SIZE - FOOTER_SIZE;

/// Validation signature carried by every footer.
pub const SIGNATURE: u32 = 0x08012025;

/// Bytes per save bank.
pub const BANK_SIZE: usize = SECTION_COUNT * SECTION_SIZE;

/// Minimum size of a full save file (two banks).
pub const SAVE_SIZE: usize = 0x20000;

/// Data-region length declared for each logical section id. The checksum
/// only covers this many bytes; the rest of the section is padding.
pub const SECTION_DATA_SIZES: [usize; SECTION_COUNT] = [
    3884, 3968, 3968, 3968, 3848, 3968, 3968, 3968, 3968, 3968, 3968, 3968, 3968, 2000,
];

/// The trailing metadata of one section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionFooter {
    /// Logical role of the section, 0..14.
    pub section_id: u8,
    /// Word-sum checksum over the declared data region.
    pub checksum: u16,
    /// Must equal [`SIGNATURE`] in a valid save.
    pub signature: u32,
    /// Monotonic save counter, shared by all sections of a bank.
    pub save_index: u32,
}

impl SectionFooter {
    /// Read the footer out of a full 0x1000-byte section slice.
    pub fn parse(section: &[u8]) -> Self {
        let f = &section[FOOTER_OFFSET..];
        Self {
            section_id: f[0],
            checksum: u16::from_le_bytes([f[2], f[3]]),
            signature: u32::from_le_bytes([f[4], f[5], f[6], f[7]]),
            save_index: u32::from_le_bytes([f[8], f[9], f[10], f[11]]),
        }
    }

    /// Write the footer into a full 0x1000-byte section slice. The
    /// padding byte between id and checksum is left as found.
    pub fn write(&self, section: &mut [u8]) {
        let f = &mut section[FOOTER_OFFSET..];
        f[0] = self.section_id;
        f[2..4].copy_from_slice(&self.checksum.to_le_bytes());
        f[4..8].copy_from_slice(&self.signature.to_le_bytes());
        f[8..12].copy_from_slice(&self.save_index.to_le_bytes());
    }
}

/// Word-sum checksum over a section's declared data region.
///
/// The on-disk value is the 32-bit little-endian word sum folded to 16
/// bits by adding its halves.
pub fn section_checksum(section_data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    for word in section_data.chunks_exact(4) {
        sum = sum.wrapping_add(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
    }
    (sum >> 16).wrapping_add(sum) as u16
}

/// Whether every section of a physical bank matches its stored checksum.
///
/// Used to arbitrate between redundant banks; reads only, reports nothing.
pub(crate) fn bank_checksums_ok(bank: &[u8]) -> bool {
    (0..SECTION_COUNT).all(|slot| {
        let section = &bank[slot * SECTION_SIZE..(slot + 1) * SECTION_SIZE];
        let footer = SectionFooter::parse(section);
        match SECTION_DATA_SIZES.get(usize::from(footer.section_id)) {
            Some(&size) => section_checksum(&section[..size]) == footer.checksum,
            None => false,
        }
    })
}

/// One save bank's sections in logical id order, plus the physical
/// arrangement they were loaded from.
///
/// All field access and editing happens against this logical view; the
/// physical bank is only reconstructed when the save is written out.
#[derive(Clone, Debug)]
pub struct SectionArena {
    /// `SECTION_COUNT * SECTION_SIZE` bytes, section of id `i` at `i * SECTION_SIZE`.
    data: Box<[u8]>,
    /// Section id found in each physical slot at load time.
    slot_ids: [u8; SECTION_COUNT],
}

impl SectionArena {
    /// Reorder a physical save bank into logical id order.
    ///
    /// Every footer is validated on the way: the signature must match and
    /// the section ids must form a permutation of 0..14.
    pub fn unshuffle(bank: &[u8]) -> Result<Self> {
        if bank.len() < BANK_SIZE {
            return Err(Error::TruncatedSave {
                expected: BANK_SIZE,
                actual: bank.len(),
            });
        }

        let mut data = vec![0u8; BANK_SIZE].into_boxed_slice();
        let mut slot_ids = [0u8; SECTION_COUNT];
        let mut seen = [false; SECTION_COUNT];

        for slot in 0..SECTION_COUNT {
            let section = &bank[slot * SECTION_SIZE..(slot + 1) * SECTION_SIZE];
            let footer = SectionFooter::parse(section);

            if footer.signature != SIGNATURE {
                return Err(Error::InvalidSignature {
                    slot,
                    found: footer.signature,
                });
            }

            let id = usize::from(footer.section_id);
            if id >= SECTION_COUNT {
                return Err(Error::SectionIdOutOfRange {
                    slot,
                    section_id: footer.section_id,
                });
            }
            if seen[id] {
                return Err(Error::DuplicateSectionId {
                    section_id: footer.section_id,
                });
            }
            seen[id] = true;

            data[id * SECTION_SIZE..(id + 1) * SECTION_SIZE].copy_from_slice(section);
            slot_ids[slot] = footer.section_id;
        }

        debug!("Physical section order: {slot_ids:?}");
        Ok(Self { data, slot_ids })
    }

    /// Write the sections back into physical order, restoring the exact
    /// arrangement recorded by [`SectionArena::unshuffle`].
    pub fn shuffle_into(&self, bank: &mut [u8]) {
        for slot in 0..SECTION_COUNT {
            let id = usize::from(self.slot_ids[slot]);
            bank[slot * SECTION_SIZE..(slot + 1) * SECTION_SIZE]
                .copy_from_slice(&self.data[id * SECTION_SIZE..(id + 1) * SECTION_SIZE]);
        }
    }

    /// Section id found in each physical slot at load time.
    pub fn slot_ids(&self) -> &[u8; SECTION_COUNT] {
        &self.slot_ids
    }

    /// Full section (data and footer) of the given logical id.
    pub fn section(&self, id: usize) -> &[u8] {
        &self.data[id * SECTION_SIZE..(id + 1) * SECTION_SIZE]
    }

    /// Declared data region of the given logical id.
    pub fn section_data(&self, id: usize) -> &[u8] {
        &self.data[id * SECTION_SIZE..id * SECTION_SIZE + SECTION_DATA_SIZES[id]]
    }

    /// Mutable declared data region of the given logical id.
    pub fn section_data_mut(&mut self, id: usize) -> &mut [u8] {
        &mut self.data[id * SECTION_SIZE..id * SECTION_SIZE + SECTION_DATA_SIZES[id]]
    }

    /// Save counter of the bank, read from section 0's footer.
    pub fn save_index(&self) -> u32 {
        SectionFooter::parse(self.section(0)).save_index
    }

    /// Compare every section's stored checksum against its computed
    /// value. Mismatches are reported, never corrected.
    pub fn verify_checksums(&self) {
        for id in 0..SECTION_COUNT {
            let computed = section_checksum(self.section_data(id));
            let stored = SectionFooter::parse(self.section(id)).checksum;
            if computed != stored {
                warn!("Section {id} checksum mismatch: stored {stored:#06x}, computed {computed:#06x}");
            }
        }
    }

    /// Recompute and store every section's checksum.
    pub fn update_checksums(&mut self) {
        for id in 0..SECTION_COUNT {
            let checksum = section_checksum(self.section_data(id));
            let offset = id * SECTION_SIZE + FOOTER_OFFSET + 2;
            self.data[offset..offset + 2].copy_from_slice(&checksum.to_le_bytes());
        }
    }
}
