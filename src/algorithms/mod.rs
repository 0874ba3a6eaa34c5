//! Leaf algorithm implementations.
//!
//! Each registered algorithm exposes a uniform `init / update / final` shape
//! through [`LeafState`], a tagged enum rather than a vtable of function
//! pointers: the concrete backend for each variant is monomorphized at the
//! match arm that drives it, so there is no indirect call in the hot path
//! beyond the single dispatch on the enum discriminant.
//!
//! Mainstream algorithms (CRC32/C, MD4, MD5, SHA-1, the SHA-2 and SHA-3
//! families, Tiger, Whirlpool, RIPEMD-160, GOST94, BLAKE2s, BLAKE3) are
//! thin adapters over the corresponding RustCrypto (or reference) crate.
//! Algorithms
//! with no maintained Rust crate (HAS-160, SNEFRU, EDON-R) are implemented
//! from their published compression structure in dedicated submodules.
//! The tree-structured algorithms (TTH, AICH, BTIH) and the ED2K composite
//! chunk hash live one layer up, in [`crate::tree`], and are plugged into
//! this enum as boxed variants so [`crate::multihash::MultiHashContext`]
//! can drive them identically to a plain leaf.

pub mod edonr;
pub mod has160;
pub mod snefru;

use digest::Digest as _;
use once_cell::sync::Lazy;

use crate::registry::AlgorithmId;
use crate::tree::{aich::AichState, btih::BtihState, ed2k::Ed2kState, tth::TthState};

/// A digest value of up to 64 bytes (the largest registered digest size),
/// stored inline to avoid a heap allocation per finalized hash.
#[derive(Clone, Copy)]
pub struct DigestBuf {
    bytes: [u8; 64],
    len: usize,
}

impl DigestBuf {
    pub fn from_slice(src: &[u8]) -> Self {
        let mut bytes = [0u8; 64];
        bytes[..src.len()].copy_from_slice(src);
        Self { bytes, len: src.len() }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl std::fmt::Debug for DigestBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DigestBuf({})", crate::codec::hex_encode(self.as_slice(), false))
    }
}

static CRC32: Lazy<crc::Crc<u32>> = Lazy::new(|| crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC));
static CRC32C: Lazy<crc::Crc<u32>> = Lazy::new(|| crc::Crc::<u32>::new(&crc::CRC_32_ISCSI));

/// Per-algorithm running state.
pub enum LeafState {
    Crc32(crc::Digest<'static, u32>),
    Crc32C(crc::Digest<'static, u32>),
    Md4(md4::Md4),
    Md5(md5::Md5),
    Sha1(sha1::Sha1),
    Tiger(tiger::Tiger),
    Whirlpool(whirlpool::Whirlpool),
    Ripemd160(ripemd::Ripemd160),
    Gost94(gost94::Gost94Test),
    Gost94CryptoPro(gost94::Gost94CryptoPro),
    Has160(has160::Has160),
    Snefru128(snefru::Snefru128),
    Snefru256(snefru::Snefru256),
    Sha224(sha2::Sha224),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
    EdonR256(edonr::EdonR256),
    EdonR512(edonr::EdonR512),
    Sha3_224(sha3::Sha3_224),
    Sha3_256(sha3::Sha3_256),
    Sha3_384(sha3::Sha3_384),
    Sha3_512(sha3::Sha3_512),
    Blake2s(blake2::Blake2s256),
    Blake3(Box<blake3::Hasher>),
    Tth(Box<TthState>),
    Aich(Box<AichState>),
    Btih(Box<BtihState>),
    Ed2k(Box<Ed2kState>),
}

impl LeafState {
    pub fn new(id: AlgorithmId) -> Self {
        use AlgorithmId::*;
        match id {
            Crc32 => LeafState::Crc32(CRC32.digest()),
            Crc32c => LeafState::Crc32C(CRC32C.digest()),
            Md4 => LeafState::Md4(md4::Md4::new()),
            Md5 => LeafState::Md5(md5::Md5::new()),
            Sha1 => LeafState::Sha1(sha1::Sha1::new()),
            Tiger => LeafState::Tiger(tiger::Tiger::new()),
            Whirlpool => LeafState::Whirlpool(whirlpool::Whirlpool::new()),
            Ripemd160 => LeafState::Ripemd160(ripemd::Ripemd160::new()),
            Gost94 => LeafState::Gost94(gost94::Gost94Test::new()),
            Gost94CryptoPro => LeafState::Gost94CryptoPro(gost94::Gost94CryptoPro::new()),
            Has160 => LeafState::Has160(has160::Has160::new()),
            Snefru128 => LeafState::Snefru128(snefru::Snefru128::new()),
            Snefru256 => LeafState::Snefru256(snefru::Snefru256::new()),
            Sha224 => LeafState::Sha224(sha2::Sha224::new()),
            Sha256 => LeafState::Sha256(sha2::Sha256::new()),
            Sha384 => LeafState::Sha384(sha2::Sha384::new()),
            Sha512 => LeafState::Sha512(sha2::Sha512::new()),
            EdonR256 => LeafState::EdonR256(edonr::EdonR256::new()),
            EdonR512 => LeafState::EdonR512(edonr::EdonR512::new()),
            Sha3_224 => LeafState::Sha3_224(sha3::Sha3_224::new()),
            Sha3_256 => LeafState::Sha3_256(sha3::Sha3_256::new()),
            Sha3_384 => LeafState::Sha3_384(sha3::Sha3_384::new()),
            Sha3_512 => LeafState::Sha3_512(sha3::Sha3_512::new()),
            Blake2s => LeafState::Blake2s(blake2::Blake2s256::new()),
            Blake3 => LeafState::Blake3(Box::new(blake3::Hasher::new())),
            Tth => LeafState::Tth(Box::new(TthState::new())),
            Aich => LeafState::Aich(Box::new(AichState::new())),
            Btih => LeafState::Btih(Box::new(BtihState::new())),
            Ed2k => LeafState::Ed2k(Box::new(Ed2kState::new())),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            LeafState::Crc32(c) | LeafState::Crc32C(c) => c.update(data),
            LeafState::Md4(h) => h.update(data),
            LeafState::Md5(h) => h.update(data),
            LeafState::Sha1(h) => h.update(data),
            LeafState::Tiger(h) => h.update(data),
            LeafState::Whirlpool(h) => h.update(data),
            LeafState::Ripemd160(h) => h.update(data),
            LeafState::Gost94(h) => h.update(data),
            LeafState::Gost94CryptoPro(h) => h.update(data),
            LeafState::Has160(h) => h.update(data),
            LeafState::Snefru128(h) => h.update(data),
            LeafState::Snefru256(h) => h.update(data),
            LeafState::Sha224(h) => h.update(data),
            LeafState::Sha256(h) => h.update(data),
            LeafState::Sha384(h) => h.update(data),
            LeafState::Sha512(h) => h.update(data),
            LeafState::EdonR256(h) => h.update(data),
            LeafState::EdonR512(h) => h.update(data),
            LeafState::Sha3_224(h) => h.update(data),
            LeafState::Sha3_256(h) => h.update(data),
            LeafState::Sha3_384(h) => h.update(data),
            LeafState::Sha3_512(h) => h.update(data),
            LeafState::Blake2s(h) => h.update(data),
            LeafState::Blake3(h) => {
                h.update(data);
            }
            LeafState::Tth(t) => t.update(data),
            LeafState::Aich(a) => a.update(data),
            LeafState::Btih(b) => b.update(data),
            LeafState::Ed2k(e) => e.update(data),
        }
    }

    /// Consume the state and produce its canonical-byte-order digest.
    /// Tree states additionally need access to the
    /// multi-hash context's total byte count or BTIH piece configuration,
    /// which is plumbed in by [`crate::multihash::MultiHashContext`] before
    /// this is called.
    pub fn finalize(self) -> DigestBuf {
        match self {
            LeafState::Crc32(c) | LeafState::Crc32C(c) => {
                DigestBuf::from_slice(&c.finalize().to_be_bytes())
            }
            LeafState::Md4(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Md5(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha1(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Tiger(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Whirlpool(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Ripemd160(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Gost94(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Gost94CryptoPro(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Has160(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Snefru128(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Snefru256(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha224(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha256(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha384(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha512(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::EdonR256(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::EdonR512(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha3_224(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha3_256(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha3_384(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Sha3_512(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Blake2s(h) => DigestBuf::from_slice(&h.finalize()),
            LeafState::Blake3(h) => DigestBuf::from_slice(h.finalize().as_bytes()),
            LeafState::Tth(t) => DigestBuf::from_slice(&t.finalize()),
            LeafState::Aich(a) => DigestBuf::from_slice(&a.finalize()),
            LeafState::Btih(b) => DigestBuf::from_slice(&b.finalize()),
            LeafState::Ed2k(e) => DigestBuf::from_slice(&e.finalize()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AlgorithmId::*;

    fn digest(id: crate::registry::AlgorithmId, data: &[u8]) -> Vec<u8> {
        let mut s = LeafState::new(id);
        s.update(data);
        s.finalize().as_slice().to_vec()
    }

    #[test]
    fn crc32_empty_is_zero() {
        assert_eq!(digest(Crc32, b""), vec![0, 0, 0, 0]);
    }

    #[test]
    fn md5_known_vectors() {
        assert_eq!(
            crate::codec::hex_encode(&digest(Md5, b""), false),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            crate::codec::hex_encode(&digest(Md5, b"abc"), false),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn sha1_known_vector() {
        assert_eq!(
            crate::codec::hex_encode(&digest(Sha1, b""), false),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            crate::codec::hex_encode(&digest(Sha256, b"abc"), false),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn chunking_invariance_holds_across_a_sample_of_algorithms() {
        let data = b"The quick brown fox jumps over the lazy dog";
        for id in [Md5, Sha1, Sha256, Sha3_256, Blake2s, Blake3, Tiger, Ripemd160] {
            let whole = digest(id, data);
            let mut s = LeafState::new(id);
            for chunk in data.chunks(3) {
                s.update(chunk);
            }
            let chunked = s.finalize().as_slice().to_vec();
            assert_eq!(whole, chunked, "{:?} is not chunking-invariant", id);
        }
    }
}
