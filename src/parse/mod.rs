//! Hash-file parsing: recognize one record per
//! line of an SFV/BSD/magnet/ed2k/simple/forward-or-reverse-list hash file,
//! and compute the set of algorithms a digest token could plausibly name.

pub mod hashfile;

pub use hashfile::{parse_line, Expected, ParsedRecord};
