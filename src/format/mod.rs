//! Output formatting: turning finalized digests into hex/base32/base64/raw
//! text and whole output lines (SFV, BSD, magnet, ed2k), plus the printf-like
//! template language used to render an arbitrary line per file.

pub mod digest_fmt;
pub mod hashfile_writer;
pub mod template;

pub use digest_fmt::{encode_digest, write_bsd_line, write_ed2k_link, write_magnet_line, write_sfv_line, EncodeFlags};
