//! Verification engine: compare a computed
//! [`MultiHashContext`] against a [`ParsedRecord`]'s expectations.
//!
//! The engine never aborts on a single failed file — it accumulates
//! per-file results and reports counts — that accumulation is the
//! caller's job (the CLI's `--check` loop); this module only judges one
//! file at a time.

use crate::error::VerifyMismatch;
use crate::multihash::MultiHashContext;
use crate::parse::hashfile::ParsedRecord;
use crate::registry::{self, AlgoMask, AlgorithmId};

/// Outcome of verifying one file against one parsed record.
#[derive(Debug, Clone)]
pub struct VerifyResult {
    pub mismatch: VerifyMismatch,
    /// Algorithm bits that matched some expectation.
    pub found_hash_ids: AlgoMask,
}

impl VerifyResult {
    pub fn is_ok(&self) -> bool {
        self.mismatch.is_clean()
    }
}

/// GOST equality tolerates a byte-reversed compare as an acceptable
/// alternative: some writers emit the alternative byte order that GOST94's
/// optional REVERSE flag produces.
fn digest_matches(computed: &[u8], expected_bytes: &[u8], id: AlgorithmId) -> bool {
    if computed == expected_bytes {
        return true;
    }
    if matches!(id, AlgorithmId::Gost94 | AlgorithmId::Gost94CryptoPro) {
        let reversed: Vec<u8> = computed.iter().rev().copied().collect();
        if reversed == expected_bytes {
            return true;
        }
    }
    false
}

fn decode_token(token: &str, encoding: crate::registry::Encoding) -> Option<Vec<u8>> {
    match encoding {
        crate::registry::Encoding::Hex => crate::codec::hex_decode(token),
        crate::registry::Encoding::Base32 => crate::codec::base32_decode(token),
    }
}

/// Verify `ctx` (already driven over the referenced file and finalized)
/// against `record`.
pub fn verify_file(record: &ParsedRecord, ctx: &mut MultiHashContext) -> VerifyResult {
    let mut mismatch = VerifyMismatch::default();
    let mut found_hash_ids: AlgoMask = 0;

    if let Some(expected_size) = record.file_size {
        if expected_size != ctx.total_bytes() {
            mismatch.wrong_size = true;
        }
    }

    if let Some(expected_crc32) = record.embedded_crc32 {
        if let Ok(computed) = ctx.read_digest(AlgorithmId::Crc32) {
            if computed != expected_crc32.to_be_bytes() {
                mismatch.wrong_embedded_crc32 = true;
            }
        }
    }

    for expected in &record.expected_digests {
        let Some(expected_bytes) = decode_token(&expected.token, expected.encoding) else {
            mismatch.wrong_hashes = true;
            continue;
        };

        let mut verified = false;
        for hid in registry::iter_mask(expected.candidate_algorithm_mask) {
            let Ok(computed) = ctx.read_digest(hid) else { continue };
            if digest_matches(computed, &expected_bytes, hid) {
                found_hash_ids |= hid.bit();
                verified = true;
                break;
            }
        }
        if !verified {
            mismatch.wrong_hashes = true;
        }
    }

    VerifyResult { mismatch, found_hash_ids }
}
