//! The printf-like template engine: parse a
//! format string into a list of print items once, then render it against a
//! multi-hash context and a file record for every file without reparsing.

use crate::codec;
use crate::error::{Error, Result};
use crate::format::digest_fmt::{encode_digest, EncodeFlags};
use crate::multihash::MultiHashContext;
use crate::registry::{self, AlgorithmId};

/// One file's metadata as seen by the template renderer.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub display_path: String,
    pub size: u64,
    pub mtime: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceEncoding {
    Hex,
    Base32,
    Base64,
    Raw,
}

#[derive(Debug, Clone, Copy)]
pub enum Selector {
    Hash(AlgorithmId, bool),
    Ed2kLink { with_aich: bool },
    Path,
    Basename,
    Size,
    UrlName,
    Mtime,
}

#[derive(Debug, Clone)]
pub struct Directive {
    pub zero_pad: bool,
    pub url_encode: Option<bool>,
    pub force_encoding: Option<ForceEncoding>,
    pub width: Option<usize>,
    pub selector: Selector,
}

#[derive(Debug, Clone)]
pub enum PrintItem {
    Literal(String),
    Directive(Directive),
}

/// Resolve a selector name against a descriptor's long name, or one of the
/// non-hash long-form names.
fn selector_by_long_name(name: &str) -> Option<Selector> {
    match name.to_ascii_lowercase().as_str() {
        "urlname" => return Some(Selector::UrlName),
        "mtime" => return Some(Selector::Mtime),
        _ => {}
    }
    registry::by_name(name).map(|id| Selector::Hash(id, true))
}

fn selector_by_short_letter(c: char) -> Option<Selector> {
    match c {
        'p' => Some(Selector::Path),
        'f' => Some(Selector::Basename),
        's' => Some(Selector::Size),
        'u' => Some(Selector::UrlName),
        // The ed2k-link selectors take priority over Blake3's registry
        // letter 'L': select BLAKE3 with the long form `{blake3}` instead.
        'L' => Some(Selector::Ed2kLink { with_aich: true }),
        'l' => Some(Selector::Ed2kLink { with_aich: false }),
        // An uppercase selector letter requests lowercase digest output
        // and vice versa.
        _ => registry::by_short_letter(c).map(|id| Selector::Hash(id, !c.is_uppercase())),
    }
}

/// Parse a template string into print items. Backslash escapes
/// `\t \r \n \\ \0 \xNN \NNN` (the last two hex and decimal byte literals
/// respectively) are decoded in literal runs; `%%` emits a literal `%`.
pub fn parse_template(input: &str) -> Result<Vec<PrintItem>> {
    let chars: Vec<char> = input.chars().collect();
    let mut items = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 1;
                let Some(&esc) = chars.get(i) else {
                    return Err(Error::InvalidArgument("dangling backslash escape in template"));
                };
                match esc {
                    't' => literal.push('\t'),
                    'r' => literal.push('\r'),
                    'n' => literal.push('\n'),
                    '\\' => literal.push('\\'),
                    '0' => literal.push('\0'),
                    'x' => {
                        let hi = chars.get(i + 1).copied();
                        let lo = chars.get(i + 2).copied();
                        let (Some(hi), Some(lo)) = (hi, lo) else {
                            return Err(Error::InvalidArgument("incomplete \\xNN escape in template"));
                        };
                        let byte = codec::hex_decode(&format!("{hi}{lo}"))
                            .and_then(|v| v.first().copied())
                            .ok_or(Error::InvalidArgument("invalid \\xNN escape in template"))?;
                        literal.push(byte as char);
                        i += 2;
                    }
                    d if d.is_ascii_digit() => {
                        let mut value: u32 = 0;
                        let mut consumed = 0;
                        while consumed < 3 {
                            if let Some(&c) = chars.get(i + consumed) {
                                if let Some(digit) = c.to_digit(10) {
                                    value = value * 10 + digit;
                                    consumed += 1;
                                    continue;
                                }
                            }
                            break;
                        }
                        literal.push((value & 0xff) as u8 as char);
                        i += consumed - 1;
                    }
                    _ => return Err(Error::InvalidArgument("unknown backslash escape in template")),
                }
                i += 1;
            }
            '%' => {
                if chars.get(i + 1) == Some(&'%') {
                    literal.push('%');
                    i += 2;
                    continue;
                }
                if !literal.is_empty() {
                    items.push(PrintItem::Literal(std::mem::take(&mut literal)));
                }
                i += 1;

                let mut zero_pad = false;
                if chars.get(i) == Some(&'0') {
                    zero_pad = true;
                    i += 1;
                }

                // 'u' is both the url-encode prefix flag and, bare, the legacy
                // "URL-encoded basename" selector. Only consume it as the
                // flag if a selector plausibly follows; otherwise leave it
                // for the selector stage below, where `u` on its own
                // resolves to `Selector::UrlName`.
                let mut url_encode = None;
                let starts_selector = |c: char| {
                    c == '{' || c.is_ascii_digit() || matches!(c, 'x' | 'b' | 'B' | '@') || selector_by_short_letter(c).is_some()
                };
                match chars.get(i) {
                    Some('u') if chars.get(i + 1).is_some_and(|&c| starts_selector(c)) => {
                        url_encode = Some(false);
                        i += 1;
                    }
                    Some('U') if chars.get(i + 1).is_some_and(|&c| starts_selector(c)) => {
                        url_encode = Some(true);
                        i += 1;
                    }
                    _ => {}
                }

                let mut force_encoding = None;
                match chars.get(i) {
                    Some('x') => {
                        force_encoding = Some(ForceEncoding::Hex);
                        i += 1;
                    }
                    Some('b') => {
                        force_encoding = Some(ForceEncoding::Base32);
                        i += 1;
                    }
                    Some('B') => {
                        force_encoding = Some(ForceEncoding::Base64);
                        i += 1;
                    }
                    Some('@') => {
                        force_encoding = Some(ForceEncoding::Raw);
                        i += 1;
                    }
                    _ => {}
                }

                let mut width = None;
                let width_start = i;
                while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                    i += 1;
                }
                if i > width_start {
                    let digits: String = chars[width_start..i].iter().collect();
                    width = digits.parse().ok();
                }

                let selector = if chars.get(i) == Some(&'{') {
                    let start = i + 1;
                    let end = chars[start..]
                        .iter()
                        .position(|&c| c == '}')
                        .ok_or(Error::InvalidArgument("unterminated {name} selector in template"))?
                        + start;
                    let name: String = chars[start..end].iter().collect();
                    i = end + 1;
                    selector_by_long_name(&name)
                        .ok_or(Error::InvalidArgument("unknown {name} selector in template"))?
                } else {
                    let c = *chars
                        .get(i)
                        .ok_or(Error::InvalidArgument("dangling % directive in template"))?;
                    i += 1;
                    selector_by_short_letter(c).ok_or(Error::InvalidArgument("unknown short selector in template"))?
                };

                items.push(PrintItem::Directive(Directive { zero_pad, url_encode, force_encoding, width, selector }));
            }
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }
    if !literal.is_empty() {
        items.push(PrintItem::Literal(literal));
    }
    Ok(items)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn render_directive(d: &Directive, ctx: &mut MultiHashContext, file: &FileRecord) -> String {
    let mut text = match d.selector {
        Selector::Hash(id, uppercase) => {
            let flags = match d.force_encoding {
                Some(ForceEncoding::Hex) => EncodeFlags::Hex { uppercase, reverse: false },
                Some(ForceEncoding::Base32) => EncodeFlags::Base32 { uppercase, reverse: false },
                Some(ForceEncoding::Base64) => EncodeFlags::Base64 { reverse: false },
                Some(ForceEncoding::Raw) => EncodeFlags::Raw { reverse: false },
                None => EncodeFlags::Default { uppercase, reverse: false },
            };
            encode_digest(ctx, id, flags).unwrap_or_default()
        }
        Selector::Ed2kLink { with_aich } => render_ed2k_link(ctx, &file.display_path, file.size, with_aich),
        Selector::Path => file.display_path.clone(),
        Selector::Basename => basename(&file.display_path).to_string(),
        Selector::Size => {
            let s = file.size.to_string();
            match (d.zero_pad, d.width) {
                (true, Some(w)) if s.len() < w => format!("{}{}", "0".repeat(w - s.len()), s),
                _ => s,
            }
        }
        Selector::UrlName => codec::url_encode(basename(&file.display_path).as_bytes(), false),
        Selector::Mtime => file.mtime.map(|t| t.to_string()).unwrap_or_default(),
    };

    if let Some(uppercase_hex) = d.url_encode {
        text = codec::url_encode(text.as_bytes(), uppercase_hex);
    }
    text
}

fn render_ed2k_link(ctx: &mut MultiHashContext, display_path: &str, size: u64, with_aich: bool) -> String {
    let Some(ed2k) = encode_digest(ctx, AlgorithmId::Ed2k, EncodeFlags::default_lower()) else {
        return String::new();
    };
    let mut out = format!("ed2k://|file|{}|{}|{}|", codec::url_encode(display_path.as_bytes(), false), size, ed2k);
    if with_aich {
        if let Some(aich) = encode_digest(ctx, AlgorithmId::Aich, EncodeFlags::Base32 { uppercase: true, reverse: false }) {
            out.push_str(&format!("h={}|", aich));
        }
    }
    out.push('/');
    out
}

/// Render a parsed template against one file's computed digests (spec
/// §4.6). `\n` renders as a single LF; the platform-newline distinction the
/// spec calls out is a concern of the CLI's output stream, not this
/// renderer.
pub fn render(items: &[PrintItem], ctx: &mut MultiHashContext, file: &FileRecord) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            PrintItem::Literal(s) => out.push_str(s),
            PrintItem::Directive(d) => out.push_str(&render_directive(d, ctx, file)),
        }
    }
    out
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

    fn file(path: &str, size: u64) -> FileRecord {
        FileRecord { display_path: path.to_string(), size, mtime: None }
    }

    #[test]
    fn literal_text_passes_through() {
        let items = parse_template("hello world").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"");
        assert_eq!(render(&items, &mut ctx, &file("x", 0)), "hello world");
    }

    #[test]
    fn percent_percent_is_a_literal_percent() {
        let items = parse_template("100%%").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"");
        assert_eq!(render(&items, &mut ctx, &file("x", 0)), "100%");
    }

    #[test]
    fn uppercase_short_letter_renders_lowercase_digest() {
        let items = parse_template("%M").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"abc");
        assert_eq!(render(&items, &mut ctx, &file("x", 3)), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn lowercase_short_letter_renders_uppercase_digest() {
        let items = parse_template("%h").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Has160.bit(), b"abc");
        let out = render(&items, &mut ctx, &file("x", 3));
        assert!(out.chars().all(|c| !c.is_ascii_alphabetic() || c.is_uppercase()));
    }

    #[test]
    fn gost_and_gost_cryptopro_are_distinct_selectors() {
        let mut ctx = ctx_for(AlgorithmId::Gost94.bit() | AlgorithmId::Gost94CryptoPro.bit(), b"abc");
        let o = render(&parse_template("%o").unwrap(), &mut ctx, &file("x", 3));
        let big_o = render(&parse_template("%O").unwrap(), &mut ctx, &file("x", 3));
        assert_ne!(o.to_ascii_lowercase(), big_o.to_ascii_lowercase());
    }

    #[test]
    fn basename_and_path_selectors() {
        let items = parse_template("%p | %f").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"");
        let rendered = render(&items, &mut ctx, &file("dir/sub/file.bin", 0));
        assert_eq!(rendered, "dir/sub/file.bin | file.bin");
    }

    #[test]
    fn size_selector_supports_zero_padding_with_width() {
        let items = parse_template("%08s").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"");
        assert_eq!(render(&items, &mut ctx, &file("x", 42)), "00000042");
    }

    #[test]
    fn force_encoding_overrides_default() {
        let items = parse_template("%bM").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"abc");
        let out = render(&items, &mut ctx, &file("x", 3));
        assert_eq!(out, codec::base32_encode(&codec::hex_decode("900150983cd24fb0d6963f7d28e17f72").unwrap(), false));
    }

    #[test]
    fn url_encode_flag_wraps_the_directive_output() {
        let items = parse_template("%uf").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"");
        assert_eq!(render(&items, &mut ctx, &file("my file.bin", 0)), "my%20file.bin");
    }

    #[test]
    fn backslash_escapes_decode_in_literals() {
        let items = parse_template("a\\tb\\n").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"");
        assert_eq!(render(&items, &mut ctx, &file("x", 0)), "a\tb\n");
    }

    #[test]
    fn bare_u_selector_is_url_encoded_basename() {
        let items = parse_template("%u").unwrap();
        let mut ctx = ctx_for(AlgorithmId::Md5.bit(), b"");
        assert_eq!(render(&items, &mut ctx, &file("dir/my file.bin", 0)), "my%20file.bin");
    }

    #[test]
    fn unknown_short_selector_is_an_error() {
        assert!(parse_template("%z").is_err());
    }
}
