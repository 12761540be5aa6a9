//! Detection and bank arbitration over synthetic save buffers.

use gen3_save::sections::{
    BANK_SIZE, SECTION_COUNT, SECTION_DATA_SIZES, SECTION_SIZE, SIGNATURE, section_checksum,
};
use gen3_save::{Bank, SAVE_SIZE, SectionFooter, Variant, detect, is_valid_buffer, is_valid_file};
use tempfile::TempDir;

/// Physical arrangement used by most fixtures; exercises the shuffle.
const ROTATED: [u8; SECTION_COUNT] = [3, 1, 4, 0, 2, 5, 6, 7, 8, 9, 10, 11, 12, 13];

/// Write one qualifying bank. `section0_words` is patched into section
/// 0's data region before checksums are taken.
fn write_bank(
    buffer: &mut [u8],
    bank: Bank,
    slot_ids: &[u8; SECTION_COUNT],
    save_index: u32,
    section0_words: &[(usize, u32)],
) {
    for (slot, &id) in slot_ids.iter().enumerate() {
        let start = bank.offset() + slot * SECTION_SIZE;
        let section = &mut buffer[start..start + SECTION_SIZE];
        if id == 0 {
            for &(offset, word) in section0_words {
                section[offset..offset + 4].copy_from_slice(&word.to_le_bytes());
            }
        }
        let checksum = section_checksum(&section[..SECTION_DATA_SIZES[usize::from(id)]]);
        SectionFooter {
            section_id: id,
            checksum,
            signature: SIGNATURE,
            save_index,
        }
        .write(section);
    }
}

/// Security-key words a save of the given variant would carry, at the
/// offsets the engine reads them from. FireRed/LeafGreen additionally
/// gets a nonzero filler at the Ruby/Sapphire offset, like a real save,
/// so earlier trial candidates cannot match by accident.
fn key_words(variant: Variant, key: u32) -> Vec<(usize, u32)> {
    match variant {
        Variant::RubySapphire => vec![(0x0AC, key)],
        Variant::Emerald => vec![(0x0AC, key), (0xAF8, key)],
        Variant::FireRedLeafGreen => vec![(0x0AC, 0x5150_3333), (0x1F4, key), (0xF20, key)],
    }
}

fn keyed_save(variant: Variant, key: u32) -> Vec<u8> {
    let mut buffer = vec![0u8; SAVE_SIZE];
    write_bank(&mut buffer, Bank::A, &ROTATED, 1, &key_words(variant, key));
    buffer
}

#[test]
fn zero_keys_detect_as_ruby_sapphire() {
    let buffer = keyed_save(Variant::RubySapphire, 0);

    let detection = detect(&buffer).unwrap();
    assert_eq!(detection.variant, Variant::RubySapphire);
    assert_eq!(detection.bank, Bank::A);
    assert_eq!(detection.save_index, 1);

    // Classification is exclusive: the probe answers for the variant the
    // trial order settles on, not for every variant whose rule happens
    // to hold.
    assert!(is_valid_buffer(&buffer, Variant::RubySapphire));
    assert!(!is_valid_buffer(&buffer, Variant::Emerald));
}

#[test]
fn matching_nonzero_keys_detect_as_emerald() {
    let buffer = keyed_save(Variant::Emerald, 0xDEAD_BEEF);

    let detection = detect(&buffer).unwrap();
    assert_eq!(detection.variant, Variant::Emerald);
}

#[test]
fn firered_leafgreen_keys_detect_after_both_retries() {
    let buffer = keyed_save(Variant::FireRedLeafGreen, 0xCAFE_BABE);

    let detection = detect(&buffer).unwrap();
    assert_eq!(detection.variant, Variant::FireRedLeafGreen);
}

#[test]
fn disagreeing_key_copies_detect_nothing() {
    // Valid footers, but the Emerald key pair disagrees and every other
    // candidate fails its rule too.
    let mut buffer = vec![0u8; SAVE_SIZE];
    write_bank(
        &mut buffer,
        Bank::A,
        &ROTATED,
        1,
        &[(0x0AC, 0x1111_1111), (0xAF8, 0x2222_2222), (0xF20, 0x3333_3333)],
    );

    assert_eq!(detect(&buffer), None);
    for variant in [
        Variant::RubySapphire,
        Variant::Emerald,
        Variant::FireRedLeafGreen,
    ] {
        assert!(!is_valid_buffer(&buffer, variant));
    }
}

#[test]
fn unsigned_banks_detect_nothing() {
    let buffer = vec![0u8; SAVE_SIZE];
    assert_eq!(detect(&buffer), None);
}

#[test]
fn newer_bank_wins() {
    let mut buffer = vec![0u8; SAVE_SIZE];
    let keys = key_words(Variant::Emerald, 0xA5A5_0001);
    write_bank(&mut buffer, Bank::A, &ROTATED, 5, &keys);
    write_bank(&mut buffer, Bank::B, &ROTATED, 9, &keys);

    let detection = detect(&buffer).unwrap();
    assert_eq!(detection.bank, Bank::B);
    assert_eq!(detection.save_index, 9);
}

#[test]
fn tied_save_counters_prefer_bank_a() {
    let mut buffer = vec![0u8; SAVE_SIZE];
    let keys = key_words(Variant::Emerald, 0xA5A5_0001);
    write_bank(&mut buffer, Bank::A, &ROTATED, 5, &keys);
    write_bank(&mut buffer, Bank::B, &ROTATED, 5, &keys);

    assert_eq!(detect(&buffer).unwrap().bank, Bank::A);
}

#[test]
fn damaged_newer_bank_falls_back_to_the_older_one() {
    let mut buffer = vec![0u8; SAVE_SIZE];
    let keys = key_words(Variant::Emerald, 0xA5A5_0001);
    write_bank(&mut buffer, Bank::A, &ROTATED, 5, &keys);
    write_bank(&mut buffer, Bank::B, &ROTATED, 9, &keys);

    // Flip a data byte in bank B after its footers were sealed. The
    // footers still qualify, but the section checksum no longer holds.
    buffer[BANK_SIZE + 2 * SECTION_SIZE + 0x200] ^= 0xFF;

    let detection = detect(&buffer).unwrap();
    assert_eq!(detection.bank, Bank::A);
    assert_eq!(detection.save_index, 5);
}

#[test]
fn damage_in_both_banks_keeps_the_newer_one() {
    let mut buffer = vec![0u8; SAVE_SIZE];
    let keys = key_words(Variant::Emerald, 0xA5A5_0001);
    write_bank(&mut buffer, Bank::A, &ROTATED, 5, &keys);
    write_bank(&mut buffer, Bank::B, &ROTATED, 9, &keys);

    buffer[2 * SECTION_SIZE + 0x200] ^= 0xFF;
    buffer[BANK_SIZE + 2 * SECTION_SIZE + 0x200] ^= 0xFF;

    assert_eq!(detect(&buffer).unwrap().bank, Bank::B);
}

#[test]
fn short_buffer_detects_nothing() {
    assert_eq!(detect(&[0u8; SAVE_SIZE - 1]), None);
}

#[test]
fn file_probe_reports_missing_and_valid_files() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("emerald.sav");

    assert!(!is_valid_file(&path, Variant::Emerald));

    std::fs::write(&path, keyed_save(Variant::Emerald, 0xDEAD_BEEF))?;
    assert!(is_valid_file(&path, Variant::Emerald));
    assert!(!is_valid_file(&path, Variant::FireRedLeafGreen));

    std::fs::write(&path, [0u8; 100])?;
    assert!(!is_valid_file(&path, Variant::Emerald));

    Ok(())
}
