//! Primitives shared across the handheld Pokémon save formats.
//!
//! Every supported generation stores a few things the same way: packed
//! binary-coded-decimal numbers, one-bit-per-species Pokédex flags, the
//! Pokérus status nibbles, the trainer id pair, and the console-side
//! pseudo-random number generators. This crate carries those pieces so the
//! per-generation engines only contain what is actually generation-specific.
//!
//! Character-map text conversion is deliberately not here; name fields are
//! handled as raw byte slots by the engines.

pub mod bcd;
pub mod error;
pub mod pokedex;
pub mod pokerus;
pub mod prng;
pub mod trainer_id;

pub use error::Error;
pub use trainer_id::TrainerId;

/// Result type for sav-common operations.
pub type Result<T> = std::result::Result<T, Error>;
