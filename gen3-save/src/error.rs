//! Error types for save loading and editing

use thiserror::Error;

/// Result type for save operations
pub type Result<T> = std::result::Result<T, Error>;

/// Save engine error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer or file smaller than the fixed save size
    #[error("Truncated save: expected at least {expected} bytes, got {actual}")]
    TruncatedSave { expected: usize, actual: usize },

    /// A section footer does not carry the validation signature
    #[error("Invalid section signature in physical slot {slot}: {found:#010x}")]
    InvalidSignature { slot: usize, found: u32 },

    /// A section footer claims an id outside 0..14
    #[error("Section id out of range in physical slot {slot}: {section_id}")]
    SectionIdOutOfRange { slot: usize, section_id: u8 },

    /// Two sections claim the same id
    #[error("Duplicate section id: {section_id}")]
    DuplicateSectionId { section_id: u8 },

    /// Neither save bank passed footer and key validation
    #[error("No valid save detected in buffer")]
    NoSaveDetected,

    /// Index past the end of a fixed-size collection
    #[error("{what} out of range: {index} (maximum {max})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        max: usize,
    },

    /// Parameter error from a shared primitive
    #[error("Parameter error: {0}")]
    Param(#[from] sav_common::Error),
}
