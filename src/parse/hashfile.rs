//! Hash-file line parser.
//!
//! Recognizes one record per non-empty, non-comment line, trying each
//! known format in turn: magnet link, ed2k link, BSD, forward-list
//! (`path digest...`), reverse-list (`digest... path`), and a bare
//! single-hash line. Every extracted digest token is also classified by
//! length/alphabet into a *candidate algorithm mask*, which [`crate::verify`]
//! narrows down to the actual matching algorithm.

use crate::codec;
use crate::registry::{self, AlgoMask, Encoding};

/// One expected digest extracted from a line.
#[derive(Debug, Clone)]
pub struct Expected {
    pub bytes_offset_in_line: usize,
    pub token: String,
    pub length_chars: usize,
    pub encoding: Encoding,
    pub candidate_algorithm_mask: AlgoMask,
}

/// One parsed hash-file record.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    pub source_line_span: (usize, usize),
    pub file_path: String,
    pub file_size: Option<u64>,
    pub embedded_crc32: Option<u32>,
    pub expected_digests: Vec<Expected>,
}

/// Classify a token as a hex or base32 digest and compute the mask of
/// algorithms whose digest size matches: hex length `2k` ->
/// descriptors with `digest_size_bytes == k`; base32 length 32 or 39 ->
/// digest size 20 or 24 respectively. Returns `None` if the token matches
/// neither alphabet/length combination.
fn classify_digest(token: &str) -> Option<(Encoding, AlgoMask)> {
    if !token.is_empty() && token.len() % 2 == 0 && token.bytes().all(|b| b.is_ascii_hexdigit()) {
        let mask = registry::ids_with_digest_size(token.len() / 2);
        if mask != 0 {
            return Some((Encoding::Hex, mask));
        }
    }
    if matches!(token.len(), 32 | 39) && token.bytes().all(is_base32_char) {
        let size = if token.len() == 32 { 20 } else { 24 };
        let mask = registry::ids_with_digest_size(size);
        if mask != 0 {
            return Some((Encoding::Base32, mask));
        }
    }
    None
}

fn is_base32_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || (b'2'..=b'7').contains(&b)
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

fn offset_of(line: &str, needle: &str) -> usize {
    line.find(needle).unwrap_or(0)
}

fn expected_from_token(line: &str, token: &str) -> Option<Expected> {
    let (encoding, mask) = classify_digest(token)?;
    Some(Expected {
        bytes_offset_in_line: offset_of(line, token),
        token: token.to_string(),
        length_chars: token.len(),
        encoding,
        candidate_algorithm_mask: mask,
    })
}

/// Parse a single hash-file line. Returns `Ok(None)` for
/// comment lines (first non-whitespace byte `;` or `#`) and blank lines;
/// returns `Err` for a non-blank line that matches no recognized format
/// (the caller logs this at `warn` and moves on —
/// this function itself just reports the mismatch).
pub fn parse_line(line: &str) -> Result<Option<ParsedRecord>, &'static str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.starts_with(';') || trimmed.starts_with('#') {
        return Ok(None);
    }

    if let Some(record) = parse_magnet(trimmed) {
        return Ok(Some(record));
    }
    if let Some(record) = parse_ed2k(trimmed) {
        return Ok(Some(record));
    }
    if let Some(record) = parse_bsd(trimmed) {
        return Ok(Some(record));
    }
    if let Some(record) = parse_forward_list(trimmed) {
        return Ok(Some(record));
    }
    if let Some(record) = parse_reverse_list(trimmed) {
        return Ok(Some(record));
    }
    if let Some(record) = parse_single_hash(trimmed) {
        return Ok(Some(record));
    }
    Err("line matches no recognized hash-file format")
}

/// `magnet:?xl=<size>&dn=<name>&xt=urn:<urn>:<digest>&...`.
/// Unknown parameters are ignored; each `xt=` narrows its digest's
/// candidate mask to the single named algorithm.
fn parse_magnet(line: &str) -> Option<ParsedRecord> {
    let rest = line.strip_prefix("magnet:?")?;
    let mut file_path = String::new();
    let mut file_size = None;
    let mut expected = Vec::new();

    for param in rest.split('&') {
        if let Some(v) = param.strip_prefix("dn=") {
            file_path = String::from_utf8_lossy(&codec::url_decode(v)?).into_owned();
        } else if let Some(v) = param.strip_prefix("xl=") {
            file_size = v.parse::<u64>().ok();
        } else if let Some(v) = param.strip_prefix("xt=urn:") {
            let (urn, digest) = v.split_once(':')?;
            let mut exp = expected_from_token(line, digest)?;
            if let Some(id) = registry::by_magnet_urn(urn) {
                exp.candidate_algorithm_mask = id.bit();
            }
            expected.push(exp);
        }
    }
    if expected.is_empty() {
        return None;
    }
    Some(ParsedRecord {
        source_line_span: (0, line.len()),
        file_path: normalize_path(&file_path),
        file_size,
        embedded_crc32: None,
        expected_digests: expected,
    })
}

/// `ed2k://|file|<name>|<size>|<md4-hex>|[h=<aich-base32>|]/`.
fn parse_ed2k(line: &str) -> Option<ParsedRecord> {
    let rest = line.strip_prefix("ed2k://|file|")?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let mut fields = rest.split('|');
    let name = fields.next()?;
    let size = fields.next()?;
    let md4_hex = fields.next()?;

    let mut expected = Vec::new();
    let mut md4 = expected_from_token(line, md4_hex)?;
    md4.candidate_algorithm_mask = registry::AlgorithmId::Md4.bit();
    expected.push(md4);

    for field in fields {
        if let Some(aich) = field.strip_prefix("h=") {
            let mut exp = expected_from_token(line, aich)?;
            exp.candidate_algorithm_mask = registry::AlgorithmId::Aich.bit();
            expected.push(exp);
        }
    }

    Some(ParsedRecord {
        source_line_span: (0, line.len()),
        file_path: normalize_path(&String::from_utf8_lossy(&codec::url_decode(name)?)),
        file_size: size.parse().ok(),
        embedded_crc32: None,
        expected_digests: expected,
    })
}

/// `<ALG>(<path>) = <digest>`. The algorithm name narrows
/// the mask to that single BSD name if recognized; otherwise the generic
/// length-based mask from [`classify_digest`] is kept.
fn parse_bsd(line: &str) -> Option<ParsedRecord> {
    let open = line.find('(')?;
    let close = line.rfind(')')?;
    if close <= open {
        return None;
    }
    let alg_name = line[..open].trim();
    if alg_name.is_empty() || !alg_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    let path = &line[open + 1..close];
    let after = line[close + 1..].trim_start();
    let digest = after.strip_prefix('=')?.trim();
    if digest.is_empty() || digest.contains(char::is_whitespace) {
        return None;
    }

    let mut exp = expected_from_token(line, digest)?;
    if let Some(id) = registry::by_bsd_name(alg_name) {
        exp.candidate_algorithm_mask = id.bit();
    }

    Some(ParsedRecord {
        source_line_span: (0, line.len()),
        file_path: normalize_path(path),
        file_size: None,
        embedded_crc32: None,
        expected_digests: vec![exp],
    })
}

/// `<path> <digest> [<digest> ...]`: the first token that is
/// *not* a valid digest, read left to right after splitting on whitespace,
/// cannot occur before the path — so this parses from the right, peeling
/// off trailing digest-shaped tokens, which also naturally yields the
/// `<digest>  <path>` "Simple" two-space form when there's exactly one
/// trailing token before the digests (the path itself never has only
/// digest-shaped tokens unless it truly is all-hex, an ambiguity this
/// parser resolves via its left/right ordering convention).
fn parse_forward_list(line: &str) -> Option<ParsedRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let mut split_at = tokens.len();
    while split_at > 1 && classify_digest(tokens[split_at - 1]).is_some() {
        split_at -= 1;
    }
    if split_at == tokens.len() || split_at == 0 {
        return None;
    }
    let path = tokens[..split_at].join(" ");
    let digest_tokens = &tokens[split_at..];

    let expected: Vec<Expected> = digest_tokens.iter().filter_map(|t| expected_from_token(line, t)).collect();
    if expected.is_empty() {
        return None;
    }
    Some(ParsedRecord {
        source_line_span: (0, line.len()),
        file_path: normalize_path(&path),
        file_size: None,
        embedded_crc32: None,
        expected_digests: expected,
    })
}

/// `<digest> [<digest> ...] <path>`: leading digest-shaped
/// tokens, detected only when at least one non-digest token follows them
/// (otherwise it is a bare [`parse_single_hash`] line); digests are
/// returned in reverse order.
fn parse_reverse_list(line: &str) -> Option<ParsedRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let mut split_at = 0;
    while split_at < tokens.len() && classify_digest(tokens[split_at]).is_some() {
        split_at += 1;
    }
    if split_at == 0 || split_at == tokens.len() {
        return None;
    }
    let path = tokens[split_at..].join(" ");
    let mut expected: Vec<Expected> = tokens[..split_at].iter().filter_map(|t| expected_from_token(line, t)).collect();
    expected.reverse();

    Some(ParsedRecord {
        source_line_span: (0, line.len()),
        file_path: normalize_path(&path),
        file_size: None,
        embedded_crc32: None,
        expected_digests: expected,
    })
}

/// A lone digest with no path, used when verifying against a
/// command-line-supplied target file.
fn parse_single_hash(line: &str) -> Option<ParsedRecord> {
    if line.split_whitespace().count() != 1 {
        return None;
    }
    let exp = expected_from_token(line, line)?;
    Some(ParsedRecord {
        source_line_span: (0, line.len()),
        file_path: String::new(),
        file_size: None,
        embedded_crc32: None,
        expected_digests: vec![exp],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AlgorithmId;

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("; created by hashkit").unwrap().is_none());
        assert!(parse_line("# a comment").unwrap().is_none());
    }

    #[test]
    fn sfv_style_forward_list_extracts_path_and_crc32() {
        let rec = parse_line("file.bin 9E107D9D").unwrap().unwrap();
        assert_eq!(rec.file_path, "file.bin");
        assert_eq!(rec.expected_digests.len(), 1);
        assert_eq!(rec.expected_digests[0].encoding, Encoding::Hex);
    }

    #[test]
    fn simple_format_two_space_reverse_list() {
        let rec = parse_line("9e107d9d372bb6826bd81d3542a419d6  dog.txt").unwrap().unwrap();
        assert_eq!(rec.file_path, "dog.txt");
        assert_eq!(rec.expected_digests[0].token, "9e107d9d372bb6826bd81d3542a419d6");
    }

    #[test]
    fn bsd_style_line() {
        let rec = parse_line("SHA256(file.bin) = ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad").unwrap().unwrap();
        assert_eq!(rec.file_path, "file.bin");
        assert_eq!(rec.expected_digests[0].candidate_algorithm_mask, AlgorithmId::Sha256.bit());
    }

    #[test]
    fn magnet_link_narrows_mask_per_urn() {
        let rec = parse_line("magnet:?xl=3&dn=abc.bin&xt=urn:md5:900150983cd24fb0d6963f7d28e17f72").unwrap().unwrap();
        assert_eq!(rec.file_path, "abc.bin");
        assert_eq!(rec.file_size, Some(3));
        assert_eq!(rec.expected_digests[0].candidate_algorithm_mask, AlgorithmId::Md5.bit());
    }

    #[test]
    fn ed2k_link_with_aich_segment() {
        let rec = parse_line("ed2k://|file|movie.avi|700000000|d41d8cd98f00b204e9800998ecf8427e|h=ABCDEFGHIJKLMNOPQRSTUVWXYZABCDEF|/").unwrap().unwrap();
        assert_eq!(rec.file_path, "movie.avi");
        assert_eq!(rec.expected_digests.len(), 2);
        assert_eq!(rec.expected_digests[0].candidate_algorithm_mask, AlgorithmId::Md4.bit());
        assert_eq!(rec.expected_digests[1].candidate_algorithm_mask, AlgorithmId::Aich.bit());
    }

    #[test]
    fn backslash_paths_are_normalized_to_forward_slashes() {
        let rec = parse_line(r"C:\dir\file.bin 9E107D9D").unwrap().unwrap();
        assert_eq!(rec.file_path, "C:/dir/file.bin");
    }

    #[test]
    fn single_hash_line_has_no_path() {
        let rec = parse_line("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap().unwrap();
        assert!(rec.file_path.is_empty());
        assert_eq!(rec.expected_digests.len(), 1);
    }

    #[test]
    fn unrecognized_line_is_an_error() {
        assert!(parse_line("not a valid hash line at all").is_err());
    }

    #[test]
    fn multiple_digests_on_one_forward_list_line() {
        let rec = parse_line("file.bin 9E107D9D da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap().unwrap();
        assert_eq!(rec.file_path, "file.bin");
        assert_eq!(rec.expected_digests.len(), 2);
    }
}
