//! Subcommand implementations for the dupescan binary.
//!
//! Scan results and match results go to stdout (or `--out`); all logging
//! goes to stderr, so output can be piped or redirected cleanly.

use anyhow::{bail, Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::matching::{self, Target};
use crate::scan;
use crate::scanfile;
use crate::skip::{self, Skip};
use crate::util::{clean_path, format_duration, SlashFix};

// ---------------------------------------------------------------------------
// scan
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(long)]
    pub dir: PathBuf,

    /// Base names to skip: a comma-separated list, or @<file> with one name
    /// per line
    #[arg(long)]
    pub skip: Option<String>,

    /// Scan file from a previous run of the same directory, used to skip
    /// re-hashing files whose name and size are unchanged
    #[arg(long)]
    pub cache: Option<Utf8PathBuf>,

    /// Write the scan file here instead of stdout (gzipped if the name ends
    /// in .gz)
    #[arg(long)]
    pub out: Option<Utf8PathBuf>,
}

pub fn run_scan(args: &ScanArgs) -> Result<()> {
    let skip = match &args.skip {
        Some(expr) => skip::parse(expr).context("invalid skip expression")?,
        None => Skip::none(),
    };
    let cache = match &args.cache {
        Some(path) => Some(scanfile::load_cache(path)?),
        None => None,
    };

    info!("scanning directory {:?}", args.dir);
    let start = std::time::Instant::now();
    let result = scan::scan(&args.dir, &skip, cache.as_ref().map(|c| &c.root))?;
    info!(
        "scanned {} files ({} bytes) in {}",
        result.root.file_count(),
        result.root.total_size(),
        format_duration(start.elapsed())
    );

    match &args.out {
        Some(path) => scanfile::save(&result, path)?,
        None => scanfile::write_json(&result, &mut std::io::stdout().lock())?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// match
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
pub struct MatchArgs {
    /// Scan file whose files are the query side of the match
    #[arg(long)]
    pub source: Utf8PathBuf,

    /// Target scan file, as [<id>=]<path>; repeatable. The default id is the
    /// cleaned path
    #[arg(long, required = true)]
    pub target: Vec<String>,

    /// Write the match result here instead of stdout
    #[arg(long)]
    pub out: Option<Utf8PathBuf>,
}

pub fn run_match(args: &MatchArgs) -> Result<()> {
    let source = scanfile::load(&args.source)?;

    let mut loaded = Vec::with_capacity(args.target.len());
    for raw in &args.target {
        let (id, path) = parse_target(raw)?;
        let result = scanfile::load(&path)?;
        loaded.push((id, result));
    }

    let targets: Vec<Target> = loaded
        .iter()
        .map(|(id, result)| Target::new(id.clone(), &result.root))
        .collect();

    info!(
        "matching {} against {} target(s)",
        args.source,
        targets.len()
    );
    let start = std::time::Instant::now();
    let result = matching::run(&source.root, &targets)?;
    info!(
        "found matches for {} fingerprints in {}",
        result.matches.len(),
        format_duration(start.elapsed())
    );

    let json = serde_json::to_string(&result)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("cannot write match result to \"{path}\""))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Split a `--target` argument into (id, path). `a=b` is an explicit id;
/// a bare path gets the cleaned path as its id.
pub fn parse_target(raw: &str) -> Result<(String, Utf8PathBuf)> {
    match raw.split_once('=') {
        Some(("", _)) => bail!("target {raw:?} has an empty id"),
        Some((_, "")) => bail!("target {raw:?} has an empty path"),
        Some((id, path)) => Ok((id.to_owned(), Utf8PathBuf::from(path))),
        None => {
            if raw.is_empty() {
                bail!("target path is empty");
            }
            let path = Utf8PathBuf::from(raw);
            let id = clean_path(&path).into_string().slash_fix();
            Ok((id, path))
        }
    }
}
