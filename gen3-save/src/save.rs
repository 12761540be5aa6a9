//! Save detection, loading, and the top-level editing handle.
//!
//! A save file carries two banks of 14 sections each; the game
//! alternates between them and the bank with the higher save counter is
//! the live one. [`detect`] picks the bank and game variant,
//! [`load_from_file`] and [`load_from_buffer`] build a [`Save`] whose
//! in-memory view is fully de-obfuscated, and writing re-applies every
//! layer (record cipher, key obfuscation, checksums, section shuffle)
//! before the bytes leave the process.

use std::fmt;
use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use sav_common::TrainerId;

use crate::dex;
use crate::items::{self, ItemSlot, Pocket};
use crate::offsets::{self, Section1Field};
use crate::pokemon::{self, PARTY_CAPACITY, PARTY_RECORD_SIZE, Pokemon, PokemonMut};
use crate::sections::{
    self, BANK_SIZE, SAVE_SIZE, SECTION_COUNT, SECTION_DATA_SIZES, SECTION_SIZE, SIGNATURE,
    SectionArena, SectionFooter,
};
use crate::security::{self, SecurityKeys};
use crate::storage::BoxStorage;
use crate::{Error, Result, Variant};

/// The party count word precedes the six party records.
const PARTY_RECORDS_OFFSET: usize = 4;

/// One of the two redundant save banks inside a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bank {
    A,
    B,
}

impl Bank {
    /// Byte offset of this bank within the save file.
    pub fn offset(self) -> usize {
        match self {
            Bank::A => 0,
            Bank::B => BANK_SIZE,
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bank::A => "A",
            Bank::B => "B",
        })
    }
}

/// Outcome of probing a save buffer: which variant, which bank, and the
/// winning bank's save counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub variant: Variant,
    pub bank: Bank,
    pub save_index: u32,
}

fn bank_bytes(buffer: &[u8], bank: Bank) -> &[u8] {
    &buffer[bank.offset()..bank.offset() + BANK_SIZE]
}

fn bank_bytes_mut(buffer: &mut [u8], bank: Bank) -> &mut [u8] {
    &mut buffer[bank.offset()..bank.offset() + BANK_SIZE]
}

/// Check one bank's footers and security keys.
///
/// Every section must carry the validation signature. The variant is
/// then chosen by reading the redundant key pair at each candidate's
/// offsets, in a fixed trial order, and taking the first variant whose
/// acceptance rule holds. Section 0 is located by footer id, never by
/// physical position.
fn qualify_bank(bank_data: &[u8], bank: Bank) -> Option<Detection> {
    let mut section0 = None;
    for slot in 0..SECTION_COUNT {
        let section = &bank_data[slot * SECTION_SIZE..(slot + 1) * SECTION_SIZE];
        let footer = SectionFooter::parse(section);
        if footer.signature != SIGNATURE {
            return None;
        }
        if footer.section_id == 0 && section0.is_none() {
            section0 = Some((footer.save_index, &section[..SECTION_DATA_SIZES[0]]));
        }
    }
    let (save_index, section0_data) = section0?;

    for variant in Variant::TRIAL_ORDER {
        let keys = SecurityKeys::read(section0_data, variant);
        if keys.valid_for(variant) {
            debug!("Bank {bank} qualifies as {variant}, save index {save_index}");
            return Some(Detection {
                variant,
                bank,
                save_index,
            });
        }
    }
    None
}

/// Probe a buffer for a usable save.
///
/// Both banks are qualified independently; when both pass, the higher
/// save counter wins (bank A on a tie), unless the winner fails its
/// section checksums while the loser passes, in which case the older
/// bank is taken instead. Returns `None` for buffers that are too short
/// or contain no qualifying bank.
pub fn detect(buffer: &[u8]) -> Option<Detection> {
    if buffer.len() < SAVE_SIZE {
        return None;
    }

    let a = qualify_bank(bank_bytes(buffer, Bank::A), Bank::A);
    let b = qualify_bank(bank_bytes(buffer, Bank::B), Bank::B);

    match (a, b) {
        (Some(a), Some(b)) => {
            let (winner, loser) = if b.save_index > a.save_index {
                (b, a)
            } else {
                (a, b)
            };
            if !sections::bank_checksums_ok(bank_bytes(buffer, winner.bank))
                && sections::bank_checksums_ok(bank_bytes(buffer, loser.bank))
            {
                let newer = winner.bank;
                let older = loser.bank;
                debug!("Bank {newer} fails its checksums, falling back to bank {older}");
                return Some(loser);
            }
            Some(winner)
        }
        (Some(one), None) | (None, Some(one)) => Some(one),
        (None, None) => None,
    }
}

/// Whether a buffer holds a loadable save classified as the given
/// variant. Pure probe, no mutation.
pub fn is_valid_buffer(buffer: &[u8], variant: Variant) -> bool {
    detect(buffer).is_some_and(|d| d.variant == variant)
}

/// Whether a file holds a loadable save of the given variant. IO
/// failures degrade to `false`.
pub fn is_valid_file(path: impl AsRef<Path>, variant: Variant) -> bool {
    fs::read(path).is_ok_and(|data| is_valid_buffer(&data, variant))
}

/// Backing bytes of a loaded save: either an owned copy read from disk
/// or a caller-provided buffer edited in place.
#[derive(Debug)]
enum RawSave<'a> {
    Owned(Box<[u8]>),
    Borrowed(&'a mut [u8]),
}

impl RawSave<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            RawSave::Owned(data) => data,
            RawSave::Borrowed(data) => data,
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            RawSave::Owned(data) => data,
            RawSave::Borrowed(data) => data,
        }
    }
}

/// Hours, minutes, seconds, and frames of play time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimePlayed {
    pub hours: u16,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
}

/// The in-game options block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub button_mode: u8,
    pub text: u8,
    pub sound_battle: u8,
}

/// A loaded, editable save.
///
/// The live bank's sections are held in logical order with every
/// obfuscation layer removed, so accessors read and write plain values.
/// Nothing reaches the backing buffer until [`Save::write_to_file`] or
/// [`Save::write_back`] runs; the non-live bank is left byte for byte
/// as it was loaded.
#[derive(Debug)]
pub struct Save<'a> {
    raw: RawSave<'a>,
    bank: Bank,
    variant: Variant,
    keys: SecurityKeys,
    arena: SectionArena,
    boxes: BoxStorage,
}

/// Load a save from a file, detecting variant and live bank.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Save<'static>> {
    let data = fs::read(path)?;
    build(RawSave::Owned(data.into_boxed_slice()))
}

/// Load a save from a caller-owned buffer.
///
/// The buffer is only written when [`Save::write_back`] or
/// [`Save::write_to_file`] is called.
pub fn load_from_buffer(buffer: &mut [u8]) -> Result<Save<'_>> {
    build(RawSave::Borrowed(buffer))
}

fn build(raw: RawSave<'_>) -> Result<Save<'_>> {
    let bytes = raw.bytes();
    if bytes.len() < SAVE_SIZE {
        return Err(Error::TruncatedSave {
            expected: SAVE_SIZE,
            actual: bytes.len(),
        });
    }
    let detection = detect(bytes).ok_or(Error::NoSaveDetected)?;
    let variant = detection.variant;
    let bank = detection.bank;
    debug!("Loading {variant} save from bank {bank}");

    let mut arena = SectionArena::unshuffle(bank_bytes(bytes, bank))?;
    arena.verify_checksums();

    let keys = SecurityKeys::read(arena.section_data(0), variant);

    // The in-memory view holds plain values; every layer peeled off here
    // is reapplied by `flush`.
    let section1 = arena.section_data_mut(1);
    let party_base = offsets::section1(Section1Field::Party, variant) + PARTY_RECORDS_OFFSET;
    for slot in 0..PARTY_CAPACITY {
        let offset = party_base + slot * PARTY_RECORD_SIZE;
        pokemon::decrypt(&mut section1[offset..offset + PARTY_RECORD_SIZE]);
    }

    let boxes = BoxStorage::assemble(&arena);

    let section1 = arena.section_data_mut(1);
    security::crypt_money(section1, variant, keys.key1);
    security::crypt_coins(section1, variant, keys.key1);
    items::crypt_bag(section1, variant, keys.key1);

    Ok(Save {
        raw,
        bank,
        variant,
        keys,
        arena,
        boxes,
    })
}

impl Save<'_> {
    /// Game variant the save was detected as.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Live bank the save was loaded from.
    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// Save counter of the live bank.
    pub fn save_index(&self) -> u32 {
        self.arena.save_index()
    }

    /// The redundant security-key pair read at load time.
    pub fn security_keys(&self) -> SecurityKeys {
        self.keys
    }

    /// Trainer name, in the game's character encoding.
    pub fn trainer_name(&self) -> &[u8] {
        &self.arena.section_data(0)
            [offsets::TRAINER_NAME..offsets::TRAINER_NAME + offsets::TRAINER_NAME_LEN]
    }

    pub fn trainer_name_mut(&mut self) -> &mut [u8] {
        &mut self.arena.section_data_mut(0)
            [offsets::TRAINER_NAME..offsets::TRAINER_NAME + offsets::TRAINER_NAME_LEN]
    }

    pub fn trainer_gender(&self) -> u8 {
        self.arena.section_data(0)[offsets::TRAINER_GENDER]
    }

    pub fn set_trainer_gender(&mut self, gender: u8) {
        self.arena.section_data_mut(0)[offsets::TRAINER_GENDER] = gender;
    }

    pub fn trainer_id(&self) -> TrainerId {
        TrainerId::from(LittleEndian::read_u32(
            &self.arena.section_data(0)[offsets::TRAINER_ID..],
        ))
    }

    pub fn set_trainer_id(&mut self, id: TrainerId) {
        LittleEndian::write_u32(
            &mut self.arena.section_data_mut(0)[offsets::TRAINER_ID..],
            id.full(),
        );
    }

    pub fn time_played(&self) -> TimePlayed {
        let section0 = self.arena.section_data(0);
        TimePlayed {
            hours: LittleEndian::read_u16(&section0[offsets::TIME_PLAYED_HOURS..]),
            minutes: section0[offsets::TIME_PLAYED_MINUTES],
            seconds: section0[offsets::TIME_PLAYED_SECONDS],
            frames: section0[offsets::TIME_PLAYED_FRAMES],
        }
    }

    pub fn set_time_played(&mut self, time: TimePlayed) {
        let section0 = self.arena.section_data_mut(0);
        LittleEndian::write_u16(&mut section0[offsets::TIME_PLAYED_HOURS..], time.hours);
        section0[offsets::TIME_PLAYED_MINUTES] = time.minutes;
        section0[offsets::TIME_PLAYED_SECONDS] = time.seconds;
        section0[offsets::TIME_PLAYED_FRAMES] = time.frames;
    }

    pub fn options(&self) -> Options {
        let section0 = self.arena.section_data(0);
        Options {
            button_mode: section0[offsets::OPTIONS_BUTTON_MODE],
            text: section0[offsets::OPTIONS_TEXT],
            sound_battle: section0[offsets::OPTIONS_SOUND_BATTLE],
        }
    }

    pub fn set_options(&mut self, options: Options) {
        let section0 = self.arena.section_data_mut(0);
        section0[offsets::OPTIONS_BUTTON_MODE] = options.button_mode;
        section0[offsets::OPTIONS_TEXT] = options.text;
        section0[offsets::OPTIONS_SOUND_BATTLE] = options.sound_battle;
    }

    /// Money on hand, already de-obfuscated.
    pub fn money(&self) -> u32 {
        let offset = offsets::section1(Section1Field::Money, self.variant);
        LittleEndian::read_u32(&self.arena.section_data(1)[offset..])
    }

    pub fn set_money(&mut self, money: u32) {
        let offset = offsets::section1(Section1Field::Money, self.variant);
        LittleEndian::write_u32(&mut self.arena.section_data_mut(1)[offset..], money);
    }

    pub fn casino_coins(&self) -> u16 {
        let offset =
            offsets::section1(Section1Field::Money, self.variant) + offsets::COINS_FROM_MONEY;
        LittleEndian::read_u16(&self.arena.section_data(1)[offset..])
    }

    pub fn set_casino_coins(&mut self, coins: u16) {
        let offset =
            offsets::section1(Section1Field::Money, self.variant) + offsets::COINS_FROM_MONEY;
        LittleEndian::write_u16(&mut self.arena.section_data_mut(1)[offset..], coins);
    }

    /// Gym badges as an 8-bit mask, first badge in bit 0.
    pub fn badges(&self) -> u8 {
        let (offset, shift) = offsets::badges(self.variant);
        let word = LittleEndian::read_u16(&self.arena.section_data(2)[offset..]);
        (word >> shift) as u8
    }

    pub fn set_badges(&mut self, badges: u8) {
        let (offset, shift) = offsets::badges(self.variant);
        let section2 = self.arena.section_data_mut(2);
        let mut word = LittleEndian::read_u16(&section2[offset..]);
        word &= !(0xFF << shift);
        word |= u16::from(badges) << shift;
        LittleEndian::write_u16(&mut section2[offset..], word);
    }

    /// Rival name. `None` on variants that do not store one.
    pub fn rival_name(&self) -> Option<&[u8]> {
        let offset = offsets::rival_name(self.variant)?;
        Some(&self.arena.section_data(4)[offset..offset + offsets::RIVAL_NAME_LEN])
    }

    pub fn rival_name_mut(&mut self) -> Option<&mut [u8]> {
        let offset = offsets::rival_name(self.variant)?;
        Some(&mut self.arena.section_data_mut(4)[offset..offset + offsets::RIVAL_NAME_LEN])
    }

    /// Number of party members the game believes it has.
    pub fn party_count(&self) -> u32 {
        let offset = offsets::section1(Section1Field::Party, self.variant);
        LittleEndian::read_u32(&self.arena.section_data(1)[offset..])
    }

    pub fn set_party_count(&mut self, count: u32) -> Result<()> {
        if count as usize > PARTY_CAPACITY {
            return Err(Error::IndexOutOfRange {
                what: "party count",
                index: count as usize,
                max: PARTY_CAPACITY,
            });
        }
        let offset = offsets::section1(Section1Field::Party, self.variant);
        LittleEndian::write_u32(&mut self.arena.section_data_mut(1)[offset..], count);
        Ok(())
    }

    fn party_record_offset(&self, slot: usize) -> Result<usize> {
        if slot >= PARTY_CAPACITY {
            return Err(Error::IndexOutOfRange {
                what: "party slot",
                index: slot,
                max: PARTY_CAPACITY - 1,
            });
        }
        Ok(offsets::section1(Section1Field::Party, self.variant)
            + PARTY_RECORDS_OFFSET
            + slot * PARTY_RECORD_SIZE)
    }

    /// Decrypted view of one party slot.
    pub fn party_pokemon(&self, slot: usize) -> Result<Pokemon<'_>> {
        let offset = self.party_record_offset(slot)?;
        Ok(Pokemon::new(
            &self.arena.section_data(1)[offset..offset + PARTY_RECORD_SIZE],
        ))
    }

    /// Mutable decrypted view of one party slot.
    pub fn party_pokemon_mut(&mut self, slot: usize) -> Result<PokemonMut<'_>> {
        let offset = self.party_record_offset(slot)?;
        Ok(PokemonMut::new(
            &mut self.arena.section_data_mut(1)[offset..offset + PARTY_RECORD_SIZE],
        ))
    }

    /// The PC box system, assembled and decrypted at load time.
    pub fn boxes(&self) -> &BoxStorage {
        &self.boxes
    }

    pub fn boxes_mut(&mut self) -> &mut BoxStorage {
        &mut self.boxes
    }

    /// Slots the given pocket holds under this save's variant.
    pub fn pocket_capacity(&self, pocket: Pocket) -> usize {
        items::capacity(self.variant, pocket)
    }

    pub fn item(&self, pocket: Pocket, index: usize) -> Result<ItemSlot> {
        items::read_slot(self.arena.section_data(1), self.variant, pocket, index)
    }

    pub fn set_item(&mut self, pocket: Pocket, index: usize, slot: ItemSlot) -> Result<()> {
        items::write_slot(
            self.arena.section_data_mut(1),
            self.variant,
            pocket,
            index,
            slot,
        )
    }

    pub fn pokedex_owned(&self, national_id: u16) -> Result<bool> {
        dex::owned(&self.arena, self.variant, national_id)
    }

    pub fn set_pokedex_owned(&mut self, national_id: u16, owned: bool) -> Result<()> {
        dex::set_owned(&mut self.arena, self.variant, national_id, owned)
    }

    pub fn pokedex_seen(&self, national_id: u16) -> Result<bool> {
        dex::seen(&self.arena, self.variant, national_id)
    }

    /// Mark a species seen or unseen in all three redundant flag copies.
    pub fn set_pokedex_seen(&mut self, national_id: u16, seen: bool) -> Result<()> {
        dex::set_seen(&mut self.arena, self.variant, national_id, seen)
    }

    pub fn national_dex_unlocked(&self) -> bool {
        dex::national_dex_unlocked(&self.arena, self.variant)
    }

    pub fn set_national_dex_unlocked(&mut self, unlocked: bool) {
        dex::set_national_dex_unlocked(&mut self.arena, self.variant, unlocked);
    }

    /// Reassemble the live bank inside the backing buffer.
    ///
    /// Works on a scratch copy of the arena so the editable state stays
    /// plain: party records get fresh checksums and the cipher, the box
    /// system is scattered back over its sections, key obfuscation is
    /// reapplied, section checksums are recomputed, and the sections are
    /// returned to their original physical order.
    fn flush(&mut self) {
        let mut scratch = self.arena.clone();

        let section1 = scratch.section_data_mut(1);
        security::crypt_money(section1, self.variant, self.keys.key1);
        security::crypt_coins(section1, self.variant, self.keys.key1);
        items::crypt_bag(section1, self.variant, self.keys.key1);

        self.boxes.disassemble(&mut scratch);

        let section1 = scratch.section_data_mut(1);
        let party_base =
            offsets::section1(Section1Field::Party, self.variant) + PARTY_RECORDS_OFFSET;
        for slot in 0..PARTY_CAPACITY {
            let offset = party_base + slot * PARTY_RECORD_SIZE;
            let record = &mut section1[offset..offset + PARTY_RECORD_SIZE];
            pokemon::set_checksum(record);
            pokemon::encrypt(record);
        }

        scratch.update_checksums();

        let bank = self.bank;
        scratch.shuffle_into(bank_bytes_mut(self.raw.bytes_mut(), bank));
    }

    /// Flush edits into the backing buffer without touching disk.
    ///
    /// For [`load_from_buffer`] this updates the caller's slice in place.
    pub fn write_back(&mut self) {
        self.flush();
    }

    /// Flush edits and write the full save file.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.flush();
        fs::write(path, self.raw.bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_offsets() {
        assert_eq!(Bank::A.offset(), 0);
        assert_eq!(Bank::B.offset(), 0xE000);
    }

    #[test]
    fn short_buffer_never_detects() {
        assert_eq!(detect(&[0u8; 100]), None);
        assert!(!is_valid_buffer(&[0u8; 100], Variant::RubySapphire));
    }

    #[test]
    fn short_buffer_load_reports_truncation() {
        let mut buffer = vec![0u8; 512];
        let err = load_from_buffer(&mut buffer).unwrap_err();
        assert!(
            matches!(
                err,
                Error::TruncatedSave {
                    expected: SAVE_SIZE,
                    actual: 512
                }
            ),
            "actual error: {err:?}",
        );
    }

    #[test]
    fn blank_buffer_load_reports_no_save() {
        let mut buffer = vec![0u8; SAVE_SIZE];
        let err = load_from_buffer(&mut buffer).unwrap_err();
        assert!(matches!(err, Error::NoSaveDetected), "actual error: {err:?}");
    }

    #[test]
    fn missing_file_is_not_valid() {
        assert!(!is_valid_file(
            "/nonexistent/path/to/save.sav",
            Variant::Emerald
        ));
    }
}
