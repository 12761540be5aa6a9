//! The per-record cipher and typed views over stored Pokémon.
//!
//! Every stored record keeps its identity header in the clear and hides
//! the rest behind two layers: the 48-byte payload is XORed word-by-word
//! with `personality ^ ot_id`, and its four 12-byte substructures
//! (Growth, Attacks, Condition, Misc) are laid out in one of 24 physical
//! orders selected by `personality % 24`. A 16-bit word sum over the
//! plaintext payload gates the whole thing: the games treat a record
//! whose stored checksum disagrees as a Bad Egg.
//!
//! There is no cross-record state; each of the 6 party and 420 box
//! records goes through [`decrypt`] and [`encrypt`] independently.

use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

use sav_common::TrainerId;

use crate::{Error, Result};

/// Bytes per stored (box) record.
pub const BOX_RECORD_SIZE: usize = 80;

/// Bytes per party record: the stored form plus the battle trailer.
pub const PARTY_RECORD_SIZE: usize = 100;

/// Party slots.
pub const PARTY_CAPACITY: usize = 6;

/// Raw byte length of the nickname slot.
pub const NICKNAME_LEN: usize = 10;

/// Raw byte length of the original-trainer name slot.
pub const OT_NAME_LEN: usize = 7;

const PERSONALITY_OFFSET: usize = 0x00;
const OT_ID_OFFSET: usize = 0x04;
const NICKNAME_OFFSET: usize = 0x08;
const LANGUAGE_OFFSET: usize = 0x12;
const OT_NAME_OFFSET: usize = 0x14;
const MARKINGS_OFFSET: usize = 0x1B;
const CHECKSUM_OFFSET: usize = 0x1C;

const PAYLOAD_OFFSET: usize = 0x20;
const PAYLOAD_SIZE: usize = 48;
const SUBSTRUCT_SIZE: usize = 12;

// Canonical payload layout once a record is decrypted.
const GROWTH_OFFSET: usize = PAYLOAD_OFFSET;
const ATTACKS_OFFSET: usize = PAYLOAD_OFFSET + SUBSTRUCT_SIZE;
const CONDITION_OFFSET: usize = PAYLOAD_OFFSET + 2 * SUBSTRUCT_SIZE;
const MISC_OFFSET: usize = PAYLOAD_OFFSET + 3 * SUBSTRUCT_SIZE;

// Battle trailer carried only by party records.
const STATUS_OFFSET: usize = 0x50;
const LEVEL_OFFSET: usize = 0x54;
const POKERUS_TIME_OFFSET: usize = 0x55;
const CURRENT_HP_OFFSET: usize = 0x56;
const MAX_HP_OFFSET: usize = 0x58;
const ATTACK_OFFSET: usize = 0x5A;
const DEFENSE_OFFSET: usize = 0x5C;
const SPEED_OFFSET: usize = 0x5E;
const SP_ATTACK_OFFSET: usize = 0x60;
const SP_DEFENSE_OFFSET: usize = 0x62;

/// Physical slot of each canonical substructure (Growth, Attacks,
/// Condition, Misc), selected by `personality % 24`. The rows follow the
/// format's published ordering list.
const SUBSTRUCT_ORDERS: [[usize; 4]; 24] = [
    // Growth first
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [0, 3, 1, 2],
    [0, 2, 3, 1],
    [0, 3, 2, 1],
    // Attacks first
    [1, 0, 2, 3],
    [1, 0, 3, 2],
    [2, 0, 1, 3],
    [3, 0, 1, 2],
    [2, 0, 3, 1],
    [3, 0, 2, 1],
    // Condition first
    [1, 2, 0, 3],
    [1, 3, 0, 2],
    [2, 1, 0, 3],
    [3, 1, 0, 2],
    [2, 3, 0, 1],
    [3, 2, 0, 1],
    // Misc first
    [1, 2, 3, 0],
    [1, 3, 2, 0],
    [2, 1, 3, 0],
    [3, 1, 2, 0],
    [2, 3, 1, 0],
    [3, 2, 1, 0],
];

/// XOR the payload words with the record's own key.
fn crypt_payload(record: &mut [u8]) {
    let key = LittleEndian::read_u32(&record[PERSONALITY_OFFSET..])
        ^ LittleEndian::read_u32(&record[OT_ID_OFFSET..]);
    for word in record[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE].chunks_exact_mut(4) {
        let value = LittleEndian::read_u32(word) ^ key;
        LittleEndian::write_u32(word, value);
    }
}

/// Move the substructures between physical and canonical order.
fn reorder_payload(record: &mut [u8], to_canonical: bool) {
    let personality = LittleEndian::read_u32(&record[PERSONALITY_OFFSET..]);
    let order = &SUBSTRUCT_ORDERS[(personality % 24) as usize];

    let payload = &mut record[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE];
    let mut scratch = [0u8; PAYLOAD_SIZE];
    scratch.copy_from_slice(payload);

    for (canonical, &physical) in order.iter().enumerate() {
        let (dst, src) = if to_canonical {
            (canonical, physical)
        } else {
            (physical, canonical)
        };
        payload[dst * SUBSTRUCT_SIZE..(dst + 1) * SUBSTRUCT_SIZE]
            .copy_from_slice(&scratch[src * SUBSTRUCT_SIZE..(src + 1) * SUBSTRUCT_SIZE]);
    }
}

/// 16-bit word sum over the plaintext payload.
///
/// The sum is independent of substructure order, so it can be taken over
/// either arrangement as long as the payload is unscrambled.
pub fn payload_checksum(record: &[u8]) -> u16 {
    record[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE]
        .chunks_exact(2)
        .fold(0u16, |sum, word| {
            sum.wrapping_add(LittleEndian::read_u16(word))
        })
}

/// Recompute and store the payload checksum. Call after mutating a
/// plaintext record and before [`encrypt`].
pub fn set_checksum(record: &mut [u8]) {
    let checksum = payload_checksum(record);
    LittleEndian::write_u16(&mut record[CHECKSUM_OFFSET..], checksum);
}

/// Decrypt a record in place: unscramble the payload, then order the
/// substructures canonically.
///
/// The stored checksum is compared against the plaintext payload; a
/// mismatch is reported, never corrected.
pub fn decrypt(record: &mut [u8]) {
    crypt_payload(record);
    reorder_payload(record, true);

    let stored = LittleEndian::read_u16(&record[CHECKSUM_OFFSET..]);
    let computed = payload_checksum(record);
    if stored != computed {
        warn!("Record checksum mismatch: stored {stored:#06x}, computed {computed:#06x}");
    }
}

/// Encrypt a plaintext record in place. Inverse of [`decrypt`].
pub fn encrypt(record: &mut [u8]) {
    reorder_payload(record, false);
    crypt_payload(record);
}

/// Battle-derived state carried only by party records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartyStats {
    pub status: u32,
    pub level: u8,
    pub pokerus_time: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
}

/// Read-only view over a decrypted record.
///
/// Name fields are exposed as raw byte slots; decoding them is the
/// caller's concern.
#[derive(Debug)]
pub struct Pokemon<'a> {
    record: &'a [u8],
}

impl<'a> Pokemon<'a> {
    pub(crate) fn new(record: &'a [u8]) -> Self {
        Self { record }
    }

    pub fn personality(&self) -> u32 {
        LittleEndian::read_u32(&self.record[PERSONALITY_OFFSET..])
    }

    pub fn ot_id(&self) -> TrainerId {
        TrainerId::from_full(LittleEndian::read_u32(&self.record[OT_ID_OFFSET..]))
    }

    pub fn nickname(&self) -> &'a [u8] {
        &self.record[NICKNAME_OFFSET..NICKNAME_OFFSET + NICKNAME_LEN]
    }

    pub fn language(&self) -> u16 {
        LittleEndian::read_u16(&self.record[LANGUAGE_OFFSET..])
    }

    pub fn ot_name(&self) -> &'a [u8] {
        &self.record[OT_NAME_OFFSET..OT_NAME_OFFSET + OT_NAME_LEN]
    }

    pub fn markings(&self) -> u8 {
        self.record[MARKINGS_OFFSET]
    }

    /// The stored payload checksum.
    pub fn checksum(&self) -> u16 {
        LittleEndian::read_u16(&self.record[CHECKSUM_OFFSET..])
    }

    pub fn species(&self) -> u16 {
        LittleEndian::read_u16(&self.record[GROWTH_OFFSET..])
    }

    pub fn held_item(&self) -> u16 {
        LittleEndian::read_u16(&self.record[GROWTH_OFFSET + 2..])
    }

    pub fn experience(&self) -> u32 {
        LittleEndian::read_u32(&self.record[GROWTH_OFFSET + 4..])
    }

    pub fn friendship(&self) -> u8 {
        self.record[GROWTH_OFFSET + 9]
    }

    pub fn moves(&self) -> [u16; 4] {
        let mut moves = [0u16; 4];
        for (i, mov) in moves.iter_mut().enumerate() {
            *mov = LittleEndian::read_u16(&self.record[ATTACKS_OFFSET + 2 * i..]);
        }
        moves
    }

    pub fn move_pp(&self) -> [u8; 4] {
        let mut pp = [0u8; 4];
        pp.copy_from_slice(&self.record[ATTACKS_OFFSET + 8..ATTACKS_OFFSET + 12]);
        pp
    }

    /// Effort values in stat order (HP, Attack, Defense, Speed,
    /// Sp. Attack, Sp. Defense).
    pub fn evs(&self) -> [u8; 6] {
        let mut evs = [0u8; 6];
        evs.copy_from_slice(&self.record[CONDITION_OFFSET..CONDITION_OFFSET + 6]);
        evs
    }

    /// The Pokérus status byte. Strain and duration nibbles decode via
    /// [`sav_common::pokerus`].
    pub fn pokerus_status(&self) -> u8 {
        self.record[MISC_OFFSET]
    }

    /// An untouched box slot is all zeroes.
    pub fn is_empty(&self) -> bool {
        self.personality() == 0 && self.species() == 0
    }

    /// Whether the view covers a party record with a battle trailer.
    pub fn is_party(&self) -> bool {
        self.record.len() >= PARTY_RECORD_SIZE
    }

    /// Battle trailer, when the underlying record carries one.
    pub fn party_stats(&self) -> Option<PartyStats> {
        if !self.is_party() {
            return None;
        }
        Some(PartyStats {
            status: LittleEndian::read_u32(&self.record[STATUS_OFFSET..]),
            level: self.record[LEVEL_OFFSET],
            pokerus_time: self.record[POKERUS_TIME_OFFSET],
            current_hp: LittleEndian::read_u16(&self.record[CURRENT_HP_OFFSET..]),
            max_hp: LittleEndian::read_u16(&self.record[MAX_HP_OFFSET..]),
            attack: LittleEndian::read_u16(&self.record[ATTACK_OFFSET..]),
            defense: LittleEndian::read_u16(&self.record[DEFENSE_OFFSET..]),
            speed: LittleEndian::read_u16(&self.record[SPEED_OFFSET..]),
            sp_attack: LittleEndian::read_u16(&self.record[SP_ATTACK_OFFSET..]),
            sp_defense: LittleEndian::read_u16(&self.record[SP_DEFENSE_OFFSET..]),
        })
    }
}

/// Mutable view over a decrypted record.
///
/// Mutations work on the plaintext; checksums and the cipher are
/// reapplied wholesale by the save path, so editors never have to keep a
/// record consistent mid-edit.
pub struct PokemonMut<'a> {
    record: &'a mut [u8],
}

impl<'a> PokemonMut<'a> {
    pub(crate) fn new(record: &'a mut [u8]) -> Self {
        Self { record }
    }

    /// Read-only view over the same record.
    pub fn as_pokemon(&self) -> Pokemon<'_> {
        Pokemon::new(self.record)
    }

    /// Change the personality value. The substructure order it selects is
    /// only consulted when the record is re-encrypted, so the plaintext
    /// view stays valid.
    pub fn set_personality(&mut self, personality: u32) {
        LittleEndian::write_u32(&mut self.record[PERSONALITY_OFFSET..], personality);
    }

    pub fn set_ot_id(&mut self, id: TrainerId) {
        LittleEndian::write_u32(&mut self.record[OT_ID_OFFSET..], id.full());
    }

    pub fn nickname_mut(&mut self) -> &mut [u8] {
        &mut self.record[NICKNAME_OFFSET..NICKNAME_OFFSET + NICKNAME_LEN]
    }

    pub fn set_language(&mut self, language: u16) {
        LittleEndian::write_u16(&mut self.record[LANGUAGE_OFFSET..], language);
    }

    pub fn ot_name_mut(&mut self) -> &mut [u8] {
        &mut self.record[OT_NAME_OFFSET..OT_NAME_OFFSET + OT_NAME_LEN]
    }

    pub fn set_markings(&mut self, markings: u8) {
        self.record[MARKINGS_OFFSET] = markings;
    }

    pub fn set_species(&mut self, species: u16) {
        LittleEndian::write_u16(&mut self.record[GROWTH_OFFSET..], species);
    }

    pub fn set_held_item(&mut self, item: u16) {
        LittleEndian::write_u16(&mut self.record[GROWTH_OFFSET + 2..], item);
    }

    pub fn set_experience(&mut self, experience: u32) {
        LittleEndian::write_u32(&mut self.record[GROWTH_OFFSET + 4..], experience);
    }

    pub fn set_friendship(&mut self, friendship: u8) {
        self.record[GROWTH_OFFSET + 9] = friendship;
    }

    /// Set one move slot and its PP.
    pub fn set_move(&mut self, slot: usize, mov: u16, pp: u8) -> Result<()> {
        if slot >= 4 {
            return Err(Error::IndexOutOfRange {
                what: "move slot",
                index: slot,
                max: 3,
            });
        }
        LittleEndian::write_u16(&mut self.record[ATTACKS_OFFSET + 2 * slot..], mov);
        self.record[ATTACKS_OFFSET + 8 + slot] = pp;
        Ok(())
    }

    pub fn set_evs(&mut self, evs: [u8; 6]) {
        self.record[CONDITION_OFFSET..CONDITION_OFFSET + 6].copy_from_slice(&evs);
    }

    /// The Pokérus status byte, for use with [`sav_common::pokerus`].
    pub fn pokerus_status_mut(&mut self) -> &mut u8 {
        &mut self.record[MISC_OFFSET]
    }

    /// Store the battle trailer of a party record.
    ///
    /// Panics when the view covers an 80-byte box record; those carry no
    /// trailer.
    pub fn set_party_stats(&mut self, stats: &PartyStats) {
        assert!(
            self.record.len() >= PARTY_RECORD_SIZE,
            "box records carry no battle trailer"
        );
        LittleEndian::write_u32(&mut self.record[STATUS_OFFSET..], stats.status);
        self.record[LEVEL_OFFSET] = stats.level;
        self.record[POKERUS_TIME_OFFSET] = stats.pokerus_time;
        LittleEndian::write_u16(&mut self.record[CURRENT_HP_OFFSET..], stats.current_hp);
        LittleEndian::write_u16(&mut self.record[MAX_HP_OFFSET..], stats.max_hp);
        LittleEndian::write_u16(&mut self.record[ATTACK_OFFSET..], stats.attack);
        LittleEndian::write_u16(&mut self.record[DEFENSE_OFFSET..], stats.defense);
        LittleEndian::write_u16(&mut self.record[SPEED_OFFSET..], stats.speed);
        LittleEndian::write_u16(&mut self.record[SP_ATTACK_OFFSET..], stats.sp_attack);
        LittleEndian::write_u16(&mut self.record[SP_DEFENSE_OFFSET..], stats.sp_defense);
    }

    /// Recompute and store the payload checksum.
    pub fn update_checksum(&mut self) {
        set_checksum(self.record);
    }
}
