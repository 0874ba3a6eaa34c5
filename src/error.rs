//! Error types for the hashing engine.
//!
//! Library code never logs and never panics on a recoverable condition; it
//! returns one of the variants below. The CLI binary is the only
//! place these get turned into log lines and process exit codes.

use thiserror::Error;

/// Structured verification result for a single hash-file entry.
///
/// Set by [`crate::verify::verify_file`]; `Ok(())` is returned instead of
/// this type when none of the three flags would be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyMismatch {
    pub wrong_size: bool,
    pub wrong_embedded_crc32: bool,
    pub wrong_hashes: bool,
}

impl VerifyMismatch {
    #[inline]
    pub fn is_clean(self) -> bool {
        !(self.wrong_size || self.wrong_embedded_crc32 || self.wrong_hashes)
    }
}

/// Canonical error type for the `hashkit` engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("could not parse hash-file line: {0}")]
    ParseError(String),

    #[error("digest(s) did not match: {0:?}")]
    VerifyMismatch(VerifyMismatch),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation canceled")]
    Canceled,
}

pub type Result<T> = std::result::Result<T, Error>;
