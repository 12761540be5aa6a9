//! Error types for the shared primitives.

use thiserror::Error;

/// Errors raised by the shared primitives.
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter fell outside the range the format can represent.
    #[error("{what} out of range: {value} (maximum {max})")]
    ParamOutOfRange {
        what: &'static str,
        value: u32,
        max: u32,
    },
}
