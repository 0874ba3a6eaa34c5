//! The algorithm registry.
//!
//! An algorithm is a single set bit in a 32-bit namespace. The
//! descriptor table below is the process-lifetime, read-only table the rest
//! of the engine resolves ids against: a `const` table plus a `match`-based
//! dispatch, not a runtime-mutable vector of function pointers.

use crate::error::{Error, Result};

pub type AlgoMask = u32;

/// One bit per registered algorithm. Values are part of the external
/// contract: they appear in CLI flags, the template language, and
/// (were bindings in scope) language bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AlgorithmId {
    Crc32 = 1 << 0,
    Crc32c = 1 << 1,
    Md4 = 1 << 2,
    Md5 = 1 << 3,
    Sha1 = 1 << 4,
    Tiger = 1 << 5,
    Tth = 1 << 6,
    Btih = 1 << 7,
    Ed2k = 1 << 8,
    Aich = 1 << 9,
    Whirlpool = 1 << 10,
    Ripemd160 = 1 << 11,
    Gost94 = 1 << 12,
    Gost94CryptoPro = 1 << 13,
    Has160 = 1 << 14,
    Snefru128 = 1 << 15,
    Snefru256 = 1 << 16,
    Sha224 = 1 << 17,
    Sha256 = 1 << 18,
    Sha384 = 1 << 19,
    Sha512 = 1 << 20,
    EdonR256 = 1 << 21,
    EdonR512 = 1 << 22,
    Sha3_224 = 1 << 23,
    Sha3_256 = 1 << 24,
    Sha3_384 = 1 << 25,
    Sha3_512 = 1 << 26,
    Blake2s = 1 << 27,
    Blake3 = 1 << 28,
}

pub const ALL_ALGORITHM_IDS: &[AlgorithmId] = &[
    AlgorithmId::Crc32,
    AlgorithmId::Crc32c,
    AlgorithmId::Md4,
    AlgorithmId::Md5,
    AlgorithmId::Sha1,
    AlgorithmId::Tiger,
    AlgorithmId::Tth,
    AlgorithmId::Btih,
    AlgorithmId::Ed2k,
    AlgorithmId::Aich,
    AlgorithmId::Whirlpool,
    AlgorithmId::Ripemd160,
    AlgorithmId::Gost94,
    AlgorithmId::Gost94CryptoPro,
    AlgorithmId::Has160,
    AlgorithmId::Snefru128,
    AlgorithmId::Snefru256,
    AlgorithmId::Sha224,
    AlgorithmId::Sha256,
    AlgorithmId::Sha384,
    AlgorithmId::Sha512,
    AlgorithmId::EdonR256,
    AlgorithmId::EdonR512,
    AlgorithmId::Sha3_224,
    AlgorithmId::Sha3_256,
    AlgorithmId::Sha3_384,
    AlgorithmId::Sha3_512,
    AlgorithmId::Blake2s,
    AlgorithmId::Blake3,
];

/// Reserved mask naming every registered algorithm.
pub const ALL_HASHES: AlgoMask = {
    let mut m: AlgoMask = 0;
    let mut i = 0;
    while i < ALL_ALGORITHM_IDS.len() {
        m |= ALL_ALGORITHM_IDS[i] as u32;
        i += 1;
    }
    m
};

impl AlgorithmId {
    #[inline]
    pub fn bit(self) -> AlgoMask {
        self as u32
    }

    /// Resolve a single bit back to its [`AlgorithmId`], or `None` if the
    /// bit does not name a registered algorithm (or more than one bit is set).
    pub fn from_bit(bit: AlgoMask) -> Option<Self> {
        ALL_ALGORITHM_IDS.iter().copied().find(|a| a.bit() == bit)
    }

    #[inline]
    pub fn descriptor(self) -> &'static Descriptor {
        descriptor_for(self)
    }
}

/// Text encoding an algorithm's digest is rendered in by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Base32,
}

/// Immutable per-algorithm metadata.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub id: AlgorithmId,
    /// ASCII upper-case name, used by the template engine's `{name}` form.
    pub name: &'static str,
    /// `xt=urn:<magnet_urn>:` token; `None` for algorithms with no
    /// registered URN (omitted from magnet output).
    pub magnet_urn: Option<&'static str>,
    /// Spelling used in BSD-style lines, e.g. `SHA256`, `RMD160`.
    pub bsd_name: &'static str,
    pub digest_size_bytes: usize,
    pub block_size_bytes: usize,
    pub default_encoding: Encoding,
    /// Single character used for the short template selector.
    pub short_letter: char,
}

macro_rules! desc {
    ($id:expr, $name:expr, $urn:expr, $bsd:expr, $size:expr, $block:expr, $enc:expr, $letter:expr) => {
        Descriptor {
            id: $id,
            name: $name,
            magnet_urn: $urn,
            bsd_name: $bsd,
            digest_size_bytes: $size,
            block_size_bytes: $block,
            default_encoding: $enc,
            short_letter: $letter,
        }
    };
}

static DESCRIPTORS: &[Descriptor] = &[
    desc!(AlgorithmId::Crc32, "CRC32", Some("bitprint"), "CRC32", 4, 1, Encoding::Hex, 'C'),
    desc!(AlgorithmId::Crc32c, "CRC32C", None, "CRC32C", 4, 1, Encoding::Hex, 'c'),
    desc!(AlgorithmId::Md4, "MD4", Some("md4"), "MD4", 16, 64, Encoding::Hex, '4'),
    desc!(AlgorithmId::Md5, "MD5", Some("md5"), "MD5", 16, 64, Encoding::Hex, 'M'),
    desc!(AlgorithmId::Sha1, "SHA1", Some("sha1"), "SHA1", 20, 64, Encoding::Hex, 'H'),
    desc!(AlgorithmId::Tiger, "TIGER", Some("tiger"), "TIGER", 24, 64, Encoding::Hex, 'G'),
    desc!(AlgorithmId::Tth, "TTH", Some("tree:tiger"), "TTH", 24, 1024, Encoding::Base32, 'T'),
    desc!(AlgorithmId::Btih, "BTIH", Some("btih"), "BTIH", 20, 0, Encoding::Hex, 'B'),
    desc!(AlgorithmId::Ed2k, "ED2K", Some("ed2k"), "ED2K", 16, 9_728_000, Encoding::Hex, 'E'),
    desc!(AlgorithmId::Aich, "AICH", Some("aich"), "AICH", 20, 9_728_000, Encoding::Base32, 'A'),
    desc!(AlgorithmId::Whirlpool, "WHIRLPOOL", None, "WHIRLPOOL", 64, 64, Encoding::Hex, 'W'),
    desc!(AlgorithmId::Ripemd160, "RIPEMD160", None, "RMD160", 20, 64, Encoding::Hex, 'R'),
    desc!(AlgorithmId::Gost94, "GOST94", Some("gost"), "GOST", 32, 32, Encoding::Hex, 'o'),
    desc!(AlgorithmId::Gost94CryptoPro, "GOST94-CRYPTOPRO", Some("gost-cryptopro"), "GOST-CRYPTOPRO", 32, 32, Encoding::Hex, 'O'),
    desc!(AlgorithmId::Has160, "HAS160", None, "HAS160", 20, 64, Encoding::Hex, 'h'),
    desc!(AlgorithmId::Snefru128, "SNEFRU128", Some("snefru128"), "SNEFRU128", 16, 32, Encoding::Hex, 'n'),
    desc!(AlgorithmId::Snefru256, "SNEFRU256", Some("snefru256"), "SNEFRU256", 32, 32, Encoding::Hex, 'N'),
    desc!(AlgorithmId::Sha224, "SHA224", Some("sha224"), "SHA224", 28, 64, Encoding::Hex, 'f'),
    desc!(AlgorithmId::Sha256, "SHA256", Some("sha256"), "SHA256", 32, 64, Encoding::Hex, 'S'),
    desc!(AlgorithmId::Sha384, "SHA384", Some("sha384"), "SHA384", 48, 128, Encoding::Hex, 'd'),
    desc!(AlgorithmId::Sha512, "SHA512", Some("sha512"), "SHA512", 64, 128, Encoding::Hex, 'D'),
    desc!(AlgorithmId::EdonR256, "EDON-R256", None, "EDONR256", 32, 64, Encoding::Hex, 'y'),
    desc!(AlgorithmId::EdonR512, "EDON-R512", None, "EDONR512", 64, 128, Encoding::Hex, 'Y'),
    desc!(AlgorithmId::Sha3_224, "SHA3-224", Some("sha3-224"), "SHA3-224", 28, 144, Encoding::Hex, 'j'),
    desc!(AlgorithmId::Sha3_256, "SHA3-256", Some("sha3-256"), "SHA3-256", 32, 136, Encoding::Hex, 'J'),
    desc!(AlgorithmId::Sha3_384, "SHA3-384", Some("sha3-384"), "SHA3-384", 48, 104, Encoding::Hex, 'k'),
    desc!(AlgorithmId::Sha3_512, "SHA3-512", Some("sha3-512"), "SHA3-512", 64, 72, Encoding::Hex, 'K'),
    desc!(AlgorithmId::Blake2s, "BLAKE2S", Some("blake2s"), "BLAKE2S", 32, 64, Encoding::Hex, 'b'),
    desc!(AlgorithmId::Blake3, "BLAKE3", Some("blake3"), "BLAKE3", 32, 64, Encoding::Hex, 'L'),
];

/// Resolve a descriptor for an [`AlgorithmId`]. `O(n)` over a ~29-entry
/// table; callers that need speed on a hot path cache the index themselves
/// (this is what [`crate::multihash::MultiHashContext`] does).
pub fn descriptor_for(id: AlgorithmId) -> &'static Descriptor {
    DESCRIPTORS
        .iter()
        .find(|d| d.id == id)
        .expect("every AlgorithmId has a descriptor")
}

pub fn all_descriptors() -> &'static [Descriptor] {
    DESCRIPTORS
}

/// Validate a mask: must be non-zero and contain only registered bits.
pub fn validate_mask(mask: AlgoMask) -> Result<()> {
    if mask == 0 {
        return Err(Error::InvalidArgument("mask must not be zero"));
    }
    if mask & !ALL_HASHES != 0 {
        return Err(Error::InvalidArgument("mask contains an unknown algorithm bit"));
    }
    Ok(())
}

/// Iterate the algorithm ids set in `mask`, in ascending bit-index order —
/// the order candidate-mask matching requires.
pub fn iter_mask(mask: AlgoMask) -> impl Iterator<Item = AlgorithmId> {
    ALL_ALGORITHM_IDS
        .iter()
        .copied()
        .filter(move |a| mask & a.bit() != 0)
}

/// Narrow a set of descriptors to those whose digest size matches `size`.
pub fn ids_with_digest_size(size: usize) -> AlgoMask {
    DESCRIPTORS
        .iter()
        .filter(|d| d.digest_size_bytes == size)
        .fold(0, |acc, d| acc | d.id.bit())
}

pub fn by_name(name: &str) -> Option<AlgorithmId> {
    DESCRIPTORS
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
        .map(|d| d.id)
}

pub fn by_bsd_name(name: &str) -> Option<AlgorithmId> {
    DESCRIPTORS
        .iter()
        .find(|d| d.bsd_name.eq_ignore_ascii_case(name))
        .map(|d| d.id)
}

/// Resolve a magnet `xt=urn:<urn>:...` token name back to an algorithm.
/// Algorithms with no registered URN are unreachable through this lookup,
/// matching their omission from magnet output.
pub fn by_magnet_urn(urn: &str) -> Option<AlgorithmId> {
    DESCRIPTORS
        .iter()
        .find(|d| d.magnet_urn.is_some_and(|u| u.eq_ignore_ascii_case(urn)))
        .map(|d| d.id)
}

/// Exact-case lookup: the registry assigns the upper and lower case of the
/// same letter to *different* algorithms (e.g. `o`/`O` select GOST94 vs
/// GOST94-CryptoPro, `y`/`Y` select EDON-R256 vs EDON-R512), so case must
/// disambiguate rather than fold: the template engine's convention of
/// letting the selector letter's case pick the output case only makes
/// sense if case is otherwise significant for which algorithm is named.
pub fn by_short_letter(letter: char) -> Option<AlgorithmId> {
    DESCRIPTORS.iter().find(|d| d.short_letter == letter).map(|d| d.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_has_a_unique_bit() {
        let mut seen = 0u32;
        for id in ALL_ALGORITHM_IDS {
            assert_eq!(seen & id.bit(), 0, "duplicate bit for {:?}", id);
            seen |= id.bit();
        }
    }

    #[test]
    fn all_hashes_covers_every_descriptor() {
        for d in all_descriptors() {
            assert_ne!(ALL_HASHES & d.id.bit(), 0);
        }
    }

    #[test]
    fn validate_mask_rejects_zero_and_unknown_bits() {
        assert!(validate_mask(0).is_err());
        assert!(validate_mask(1 << 31).is_err());
        assert!(validate_mask(AlgorithmId::Md5.bit()).is_ok());
    }

    #[test]
    fn by_name_is_case_insensitive() {
        assert_eq!(by_name("sha256"), Some(AlgorithmId::Sha256));
        assert_eq!(by_name("SHA256"), Some(AlgorithmId::Sha256));
    }

    #[test]
    fn by_magnet_urn_skips_urn_less_algorithms() {
        assert_eq!(by_magnet_urn("sha1"), Some(AlgorithmId::Sha1));
        assert_eq!(by_magnet_urn("whirlpool"), None);
    }

    #[test]
    fn by_short_letter_disambiguates_on_case() {
        assert_eq!(by_short_letter('o'), Some(AlgorithmId::Gost94));
        assert_eq!(by_short_letter('O'), Some(AlgorithmId::Gost94CryptoPro));
        assert_eq!(by_short_letter('y'), Some(AlgorithmId::EdonR256));
        assert_eq!(by_short_letter('Y'), Some(AlgorithmId::EdonR512));
    }
}
