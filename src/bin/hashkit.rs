//! `hashkit` command-line front end.
//!
//! This binary is the external collaborator: it owns option parsing,
//! file/directory traversal, and output-stream plumbing, and calls into the
//! `hashkit` library for everything considered core (multi-hash
//! computation, formatting, parsing, verification). It never reimplements
//! hashing logic itself.
//!
//! Exit codes: `0` all OK, `1` internal error, `2` one or more files failed
//! verification or could not be opened, `3` user-interrupted.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use hashkit::format::digest_fmt::{self, EncodeFlags};
use hashkit::format::hashfile_writer::{self, Eol};
use hashkit::format::template::{self, FileRecord};
use hashkit::multihash::MultiHashContext;
use hashkit::parse::hashfile::parse_line;
use hashkit::registry::{self, AlgoMask, AlgorithmId, ALL_HASHES};
use hashkit::tree::btih::BtihOptions;
use hashkit::verify::verify_file;

const READ_BUF_SIZE: usize = 8192;

/// Multi-algorithm message-digest utility.
#[derive(Parser, Debug)]
#[command(name = "hashkit", version, about)]
struct Cli {
    /// Files, directories, or "-" for standard input. If empty, reads stdin.
    paths: Vec<PathBuf>,

    /// Select an algorithm by name (repeatable, comma-separated allowed).
    /// Names match a registry descriptor's short name, e.g. md5, sha256,
    /// tth, btih, blake3 (case-insensitive).
    #[arg(short = 'H', long = "hash", value_delimiter = ',')]
    hash: Vec<String>,

    /// Select every registered algorithm.
    #[arg(long)]
    all: bool,

    #[arg(long)]
    crc32: bool,
    #[arg(long)]
    md5: bool,
    #[arg(long)]
    sha1: bool,
    #[arg(long)]
    sha256: bool,
    #[arg(long)]
    sha512: bool,
    #[arg(long)]
    btih: bool,
    #[arg(long)]
    ed2k: bool,
    #[arg(long)]
    tth: bool,
    #[arg(long)]
    blake3: bool,

    /// Output line format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Simple)]
    format: OutputFormat,

    /// printf-like template overriding --format.
    #[arg(long)]
    template: Option<String>,

    /// Verify files against a hash file instead of computing fresh hashes.
    #[arg(long)]
    check: Option<PathBuf>,

    /// Append newly computed lines to an existing hash file.
    #[arg(long)]
    update: Option<PathBuf>,

    /// Recurse into directories.
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Uppercase hex/base32 output.
    #[arg(long)]
    upper: bool,

    /// BTIH piece length in bytes (must be a power of two >= 16384).
    #[arg(long)]
    piece_length: Option<u64>,

    /// Mark a generated torrent as private.
    #[arg(long)]
    private: bool,

    /// Tracker announce URL for `--format torrent` (repeatable; the first
    /// becomes the primary announce, two or more also populate
    /// announce-list).
    #[arg(long = "announce")]
    announce: Vec<String>,

    /// Name stored in a generated torrent's info dict, overriding the file's
    /// own basename.
    #[arg(long = "torrent-name")]
    torrent_name: Option<String>,

    /// Use Transmission's outer-dictionary key order instead of strict BEP3
    /// lexicographic order when writing a full torrent.
    #[arg(long)]
    transmission_compat: bool,

    /// Write `--format torrent` output (raw bencoded bytes) to this path
    /// instead of attempting to print it; required when more than one file
    /// is being hashed with that format, since only one torrent is written.
    #[arg(long = "torrent-output")]
    torrent_output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Sfv,
    Bsd,
    Magnet,
    Ed2k,
    Simple,
    Torrent,
}

fn selected_mask(cli: &Cli) -> Result<AlgoMask> {
    if cli.all {
        return Ok(ALL_HASHES);
    }
    let mut mask: AlgoMask = 0;
    let flag_pairs: &[(bool, AlgorithmId)] = &[
        (cli.crc32, AlgorithmId::Crc32),
        (cli.md5, AlgorithmId::Md5),
        (cli.sha1, AlgorithmId::Sha1),
        (cli.sha256, AlgorithmId::Sha256),
        (cli.sha512, AlgorithmId::Sha512),
        (cli.btih, AlgorithmId::Btih),
        (cli.ed2k, AlgorithmId::Ed2k),
        (cli.tth, AlgorithmId::Tth),
        (cli.blake3, AlgorithmId::Blake3),
    ];
    for (set, id) in flag_pairs {
        if *set {
            mask |= id.bit();
        }
    }
    for name in &cli.hash {
        let id = registry::by_name(name.trim())
            .with_context(|| format!("unknown algorithm name: {name}"))?;
        mask |= id.bit();
    }
    if mask == 0 {
        mask = AlgorithmId::Md5.bit() | AlgorithmId::Sha1.bit();
    }
    Ok(mask)
}

fn btih_options(cli: &Cli) -> BtihOptions {
    BtihOptions {
        private: cli.private,
        infohash_only: !matches!(cli.format, OutputFormat::Torrent),
        transmission_compat: cli.transmission_compat,
        piece_length: cli.piece_length,
        name: cli.torrent_name.clone(),
        announce_urls: cli.announce.clone(),
    }
}

/// Recursively enumerate files under `root`, calling into the core one
/// file at a time; not recursive unless `--recursive` was given, matching
/// a plain directory listing otherwise.
fn collect_files(root: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    if root.is_file() {
        out.push(root.to_path_buf());
        return Ok(());
    }
    if !root.is_dir() {
        out.push(root.to_path_buf());
        return Ok(());
    }
    let mut entries: Vec<_> = std::fs::read_dir(root)
        .with_context(|| format!("reading directory {}", root.display()))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, recursive, out)?;
            }
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Drive `ctx` over a stream in fixed-size chunks.
fn hash_stream<R: Read>(ctx: &mut MultiHashContext, mut reader: R) -> Result<()> {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        match ctx.update(&buf[..n]) {
            Ok(()) => {}
            Err(hashkit::Error::Canceled) => return Err(anyhow::anyhow!("canceled")),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Render a text output line. `Torrent` has no text form (it is raw
/// bencoded bytes) and is handled separately by `emit_result`/`run_compute`.
fn render_line(ctx: &mut MultiHashContext, format: OutputFormat, display_path: &str, size: u64, upper: bool) -> Option<String> {
    match format {
        OutputFormat::Sfv => digest_fmt::write_sfv_line(ctx, display_path),
        OutputFormat::Bsd => {
            let (id, _) = ctx.digests().next()?;
            digest_fmt::write_bsd_line(ctx, id, display_path)
        }
        OutputFormat::Magnet => Some(digest_fmt::write_magnet_line(ctx, display_path, size)),
        OutputFormat::Ed2k => digest_fmt::write_ed2k_link(ctx, display_path, size),
        OutputFormat::Simple => {
            let (id, _) = ctx.digests().next()?;
            let flags = EncodeFlags::Default { uppercase: upper, reverse: false };
            let text = digest_fmt::encode_digest(ctx, id, flags)?;
            Some(format!("{text}  {display_path}"))
        }
        OutputFormat::Torrent => None,
    }
}

/// Write a generated `.torrent` body to `--torrent-output`, or report why
/// there's nothing to write (BTIH wasn't selected).
fn write_torrent_output(cli: &Cli, ctx: &MultiHashContext) -> Result<()> {
    let torrent = ctx
        .btih_torrent()
        .context("`--format torrent` requires a BTIH leaf selected (pass `--btih` or `-H btih`)")?;
    let path = cli
        .torrent_output
        .as_ref()
        .context("`--format torrent` requires `--torrent-output <path>`")?;
    std::fs::write(path, torrent).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn run_compute(cli: &Cli, mask: AlgoMask) -> Result<i32> {
    let mut files = Vec::new();
    if cli.paths.is_empty() {
        let mut ctx = MultiHashContext::init(mask)?;
        ctx.set_btih_options(btih_options(cli));
        hash_stream(&mut ctx, io::stdin().lock())?;
        ctx.finalize();
        let size = ctx.total_bytes();
        emit_result(cli, &mut ctx, "-", size)?;
        return Ok(0);
    }
    for p in &cli.paths {
        if p.as_os_str() == "-" {
            files.push(p.clone());
        } else {
            collect_files(p, cli.recursive, &mut files)?;
        }
    }

    let mut had_error = false;
    let mut written_lines = Vec::new();
    for path in &files {
        let display = path.to_string_lossy().to_string();
        let mut ctx = MultiHashContext::init(mask)?;
        ctx.set_btih_options(btih_options(cli));
        let hashed = if path.as_os_str() == "-" {
            hash_stream(&mut ctx, io::stdin().lock())
        } else {
            File::open(path)
                .with_context(|| format!("opening {display}"))
                .and_then(|f| hash_stream(&mut ctx, f).map_err(Into::into))
        };
        if let Err(e) = hashed {
            warn!(path = %display, error = %e, "failed to hash file");
            had_error = true;
            continue;
        }
        ctx.finalize();
        if cli.format == OutputFormat::Torrent {
            write_torrent_output(cli, &ctx)?;
        } else {
            let size = ctx.total_bytes();
            if let Some(line) = render_line(&mut ctx, cli.format, &display, size, cli.upper) {
                println!("{line}");
                written_lines.push(line);
            }
        }
    }

    if let Some(update_path) = &cli.update {
        let existing = std::fs::read_to_string(update_path).unwrap_or_default();
        let updated = hashfile_writer::append_to_hashfile(&existing, &written_lines, Eol::Lf);
        std::fs::write(update_path, updated).with_context(|| format!("writing {}", update_path.display()))?;
    }

    Ok(if had_error { 2 } else { 0 })
}

fn emit_result(cli: &Cli, ctx: &mut MultiHashContext, display: &str, size: u64) -> Result<()> {
    if cli.format == OutputFormat::Torrent {
        return write_torrent_output(cli, ctx);
    }
    if let Some(tmpl) = &cli.template {
        let items = template::parse_template(tmpl)?;
        let record = FileRecord { display_path: display.to_string(), size, mtime: None };
        println!("{}", template::render(&items, ctx, &record));
    } else if let Some(line) = render_line(ctx, cli.format, display, size, cli.upper) {
        println!("{line}");
    }
    Ok(())
}

fn run_check(cli: &Cli, check_path: &Path) -> Result<i32> {
    let file = File::open(check_path).with_context(|| format!("opening {}", check_path.display()))?;
    let reader = BufReader::new(file);

    let mut ok_count = 0usize;
    let mut fail_count = 0usize;

    for line in reader.lines() {
        let line = line?;
        let record = match parse_line(&line) {
            Ok(Some(r)) => r,
            Ok(None) => continue,
            Err(reason) => {
                warn!(%reason, %line, "could not parse hash-file line");
                continue;
            }
        };
        if record.file_path.is_empty() {
            continue;
        }

        let mask = record
            .expected_digests
            .iter()
            .fold(0u32, |acc, e| acc | e.candidate_algorithm_mask);
        let mut ctx = MultiHashContext::init(mask)?;
        let base = check_path.parent().unwrap_or_else(|| Path::new("."));
        let target = base.join(&record.file_path);

        match File::open(&target) {
            Ok(f) => {
                hash_stream(&mut ctx, f)?;
                ctx.finalize();
                let result = verify_file(&record, &mut ctx);
                debug!(path = %record.file_path, found = result.found_hash_ids, "verified file");
                if result.is_ok() {
                    println!("{} OK", record.file_path);
                    ok_count += 1;
                } else {
                    println!("{} FAILED", record.file_path);
                    fail_count += 1;
                }
            }
            Err(e) => {
                warn!(path = %record.file_path, error = %e, "could not open file to verify");
                println!("{} FAILED (could not open)", record.file_path);
                fail_count += 1;
            }
        }
    }

    eprintln!("{ok_count} OK, {fail_count} failed");
    Ok(if fail_count > 0 { 2 } else { 0 })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let exit_code = if let Some(check_path) = cli.check.clone() {
        run_check(&cli, &check_path)?
    } else {
        let mask = match selected_mask(&cli) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("error: {e:#}");
                std::process::exit(1);
            }
        };
        run_compute(&cli, mask)?
    };

    io::stdout().flush().ok();
    std::process::exit(exit_code);
}
