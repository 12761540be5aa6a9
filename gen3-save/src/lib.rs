//! Generation III (Game Boy Advance) Pokémon save engine
//!
//! This crate loads, edits, and writes the 128 KiB flash saves shared by
//! Ruby/Sapphire, Emerald, and FireRed/LeafGreen. It handles the parts
//! that make the format hostile to casual editing: the rotating physical
//! section order, the redundant save banks, the security-key obfuscation
//! over money and bag items, and the XOR-plus-shuffle cipher on every
//! Pokémon record.
//!
//! # Example
//!
//! ```no_run
//! use gen3_save::load_from_file;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut save = load_from_file("pokemon_emerald.sav")?;
//!     println!("Detected {}", save.variant());
//!
//!     println!("Money: {}", save.money());
//!     save.set_money(99_999);
//!
//!     save.write_to_file("pokemon_emerald.sav")?;
//!     Ok(())
//! }
//! ```

mod dex;
mod offsets;

pub mod error;
pub mod items;
pub mod pokemon;
pub mod save;
pub mod sections;
pub mod security;
pub mod storage;
pub mod variant;

pub use sav_common::TrainerId;

pub use error::{Error, Result};
pub use items::{ItemSlot, Pocket};
pub use pokemon::{PartyStats, Pokemon, PokemonMut};
pub use save::{
    Bank, Detection, Options, Save, TimePlayed, detect, is_valid_buffer, is_valid_file,
    load_from_buffer, load_from_file,
};
pub use sections::{SAVE_SIZE, SectionArena, SectionFooter};
pub use security::SecurityKeys;
pub use storage::BoxStorage;
pub use variant::Variant;
