//! The digest formatter: hex/base32/base64/raw
//! rendering of a single digest, plus the whole-line renderings (SFV, BSD,
//! magnet, ed2k) built on top of it.

use crate::codec;
use crate::multihash::MultiHashContext;
use crate::registry::{AlgorithmId, Encoding};

/// Which text form to render a digest in; `raw` bypasses
/// encoding entirely and is only meaningful to callers that want the bytes
/// verbatim (e.g. writing a torrent file's `pieces` string).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFlags {
    /// Use the algorithm descriptor's default encoding.
    Default { uppercase: bool, reverse: bool },
    Hex { uppercase: bool, reverse: bool },
    Base32 { uppercase: bool, reverse: bool },
    Base64 { reverse: bool },
    Raw { reverse: bool },
}

impl EncodeFlags {
    pub fn default_lower() -> Self {
        EncodeFlags::Default { uppercase: false, reverse: false }
    }

    fn reverse(self) -> bool {
        match self {
            EncodeFlags::Default { reverse, .. }
            | EncodeFlags::Hex { reverse, .. }
            | EncodeFlags::Base32 { reverse, .. }
            | EncodeFlags::Base64 { reverse }
            | EncodeFlags::Raw { reverse } => reverse,
        }
    }
}

/// Render one algorithm's finalized digest as text. `reverse` only makes
/// semantic sense for GOST variants but is honored unconditionally — just
/// flip the bytes.
pub fn encode_digest(ctx: &mut MultiHashContext, id: AlgorithmId, flags: EncodeFlags) -> Option<String> {
    let digest = ctx.read_digest(id).ok()?;
    let mut bytes = digest.to_vec();
    if flags.reverse() {
        bytes.reverse();
    }

    let desc = id.descriptor();
    Some(match flags {
        EncodeFlags::Default { uppercase, .. } => match desc.default_encoding {
            Encoding::Hex => codec::hex_encode(&bytes, uppercase),
            Encoding::Base32 => codec::base32_encode(&bytes, uppercase),
        },
        EncodeFlags::Hex { uppercase, .. } => codec::hex_encode(&bytes, uppercase),
        EncodeFlags::Base32 { uppercase, .. } => codec::base32_encode(&bytes, uppercase),
        EncodeFlags::Base64 { .. } => codec::base64_encode(&bytes),
        EncodeFlags::Raw { .. } => bytes.iter().map(|b| *b as char).collect(),
    })
}

/// `magnet:?xl=<size>&dn=<url-encoded path>&xt=urn:<urn>:<digest>...`.
/// SHA-1 and BTIH always render base32 in magnet links regardless of
/// their descriptor default; algorithms with no registered magnet URN are
/// skipped entirely.
pub fn write_magnet_line(ctx: &mut MultiHashContext, display_path: &str, size: u64) -> String {
    let mut out = format!("magnet:?xl={}&dn={}", size, codec::url_encode(display_path.as_bytes(), false));
    let ids: Vec<AlgorithmId> = ctx.digests().map(|(id, _)| id).collect();
    for id in ids {
        let desc = id.descriptor();
        let Some(urn) = desc.magnet_urn else { continue };
        let flags = if matches!(id, AlgorithmId::Sha1 | AlgorithmId::Btih) {
            EncodeFlags::Base32 { uppercase: true, reverse: false }
        } else {
            EncodeFlags::default_lower()
        };
        if let Some(text) = encode_digest(ctx, id, flags) {
            out.push_str(&format!("&xt=urn:{}:{}", urn, text));
        }
    }
    out
}

/// `ed2k://|file|<name>|<size>|<ed2k-hex>|[h=<aich-base32>|]/`.
pub fn write_ed2k_link(ctx: &mut MultiHashContext, display_path: &str, size: u64) -> Option<String> {
    let ed2k = encode_digest(ctx, AlgorithmId::Ed2k, EncodeFlags::default_lower())?;
    let mut out = format!(
        "ed2k://|file|{}|{}|{}|",
        codec::url_encode(display_path.as_bytes(), false),
        size,
        ed2k
    );
    if let Some(aich) = encode_digest(ctx, AlgorithmId::Aich, EncodeFlags::Base32 { uppercase: true, reverse: false }) {
        out.push_str(&format!("h={}|", aich));
    }
    out.push('/');
    Some(out)
}

/// `<ALG>(<path>) = <digest>`, the convention real BSD-style checksum tools
/// use: the label is the algorithm's upper-case BSD name, the digest itself
/// always lower-case hex (or the descriptor's default base32 for TTH/AICH).
pub fn write_bsd_line(ctx: &mut MultiHashContext, id: AlgorithmId, display_path: &str) -> Option<String> {
    let desc = id.descriptor();
    let digest = encode_digest(ctx, id, EncodeFlags::default_lower())?;
    Some(format!("{}({}) = {}", desc.bsd_name, display_path, digest))
}

/// `<path> <CRC32-hex-uppercase>`, the SFV convention.
pub fn write_sfv_line(ctx: &mut MultiHashContext, display_path: &str) -> Option<String> {
    let crc = encode_digest(ctx, AlgorithmId::Crc32, EncodeFlags::Hex { uppercase: true, reverse: false })?;
    Some(format!("{} {}", display_path, crc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multihash::MultiHashContext;

    fn ctx_for(mask: u32, data: &[u8]) -> MultiHashContext {
        let mut ctx = MultiHashContext::init(mask).unwrap();
        ctx.update(data).unwrap();
        ctx.finalize();
        ctx
    }

    #[test]
    fn encode_digest_default_is_lowercase_hex_for_md5() {
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"abc");
        assert_eq!(
            encode_digest(&mut ctx, AlgorithmId::Md5, EncodeFlags::default_lower()).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn encode_digest_default_is_base32_for_tth() {
        let mut ctx = ctx_for(AlgorithmId::Tth.bit(), b"");
        let out = encode_digest(&mut ctx, AlgorithmId::Tth, EncodeFlags::default_lower()).unwrap();
        assert_eq!(out.to_uppercase(), "LWPNACQDBZRYXW3VHJVCJ64QBZNGHOHHHZWCLNQ");
    }

    #[test]
    fn sfv_line_has_uppercase_crc32() {
        let mut ctx = ctx_for(AlgorithmId::Crc32.bit(), b"abc");
        let line = write_sfv_line(&mut ctx, "file.bin").unwrap();
        assert!(line.starts_with("file.bin "));
        assert!(line.chars().rev().take(8).all(|c| c.is_ascii_hexdigit() && (!c.is_ascii_alphabetic() || c.is_uppercase())));
    }

    #[test]
    fn bsd_line_uses_bsd_name() {
        let mut ctx = ctx_for(AlgorithmId::Ripemd160.bit(), b"abc");
        let line = write_bsd_line(&mut ctx, AlgorithmId::Ripemd160, "x").unwrap();
        assert!(line.starts_with("RMD160(x) = "));
    }

    #[test]
    fn magnet_line_uses_base32_sha1_and_skips_urn_less_algorithms() {
        let mut ctx = ctx_for(AlgorithmId::Sha1.bit() | AlgorithmId::Whirlpool.bit(), b"abc");
        let line = write_magnet_line(&mut ctx, "abc.bin", 3);
        assert!(line.starts_with("magnet:?xl=3&dn=abc.bin"));
        assert!(line.contains("xt=urn:sha1:"));
        assert!(!line.contains("whirlpool"));
    }

    #[test]
    fn ed2k_link_includes_aich_when_selected() {
        let mut ctx = ctx_for(AlgorithmId::Ed2k.bit() | AlgorithmId::Aich.bit(), b"abc");
        let link = write_ed2k_link(&mut ctx, "abc.bin", 3).unwrap();
        assert!(link.starts_with("ed2k://|file|abc.bin|3|"));
        assert!(link.contains("h="));
        assert!(link.ends_with('/'));
    }
}
