//! Hash-file writing: SFV creation banners and update-mode appends.
//!
//! Writing a *new* SFV file prepends a small comment banner with a
//! human-readable creation timestamp, following the shape
//! `calc_sums.c`/`librhash`'s CLI front end writes ahead of the checksum
//! lines themselves. *Updating* an existing hash file preserves every
//! existing line verbatim and appends new ones after normalizing line
//! endings; floating comments back to the top on update is treated as
//! cosmetic, so this module does not reorder existing lines, only appends.

/// Line-ending convention to write with: CRLF on Windows-like targets, LF
/// elsewhere; parsers accept both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eol {
    Lf,
    CrLf,
}

impl Eol {
    fn as_str(self) -> &'static str {
        match self {
            Eol::Lf => "\n",
            Eol::CrLf => "\r\n",
        }
    }
}

/// Render an SFV creation banner: one comment line naming the creation
/// time, formatted as the caller's `timestamp` string (callers own the
/// clock; this module takes no dependency on wall-clock time so it stays
/// deterministic and testable).
pub fn sfv_banner(timestamp: &str, eol: Eol) -> String {
    format!("; Generated by hashkit on {timestamp}{}", eol.as_str())
}

/// Join freshly rendered output lines into a single banner-prefixed SFV
/// file body, each terminated by `eol`.
pub fn render_new_hashfile(banner_timestamp: Option<&str>, lines: &[String], eol: Eol) -> String {
    let mut out = String::new();
    if let Some(ts) = banner_timestamp {
        out.push_str(&sfv_banner(ts, eol));
    }
    for line in lines {
        out.push_str(line);
        out.push_str(eol.as_str());
    }
    out
}

/// Append `new_lines` to `existing` content, preserving every existing
/// line verbatim and appending new ones after normalizing EOL conventions.
/// `existing` keeps whatever EOLs it already had; only the newly appended
/// lines are written with `eol`.
pub fn append_to_hashfile(existing: &str, new_lines: &[String], eol: Eol) -> String {
    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol.as_str());
    }
    for line in new_lines {
        out.push_str(line);
        out.push_str(eol.as_str());
    }
    out
}
