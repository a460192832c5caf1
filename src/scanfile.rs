//! Reading and writing persisted scan results.
//!
//! Scan files are JSON documents, gzip-wrapped when the filename ends in
//! `.gz` (detected on read, implied on write).

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{BufReader, BufWriter, Write};

use crate::cache;
use crate::tree::ScanResult;

fn is_gzipped(path: &Utf8Path) -> bool {
    path.extension() == Some("gz")
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a scan result from `path`, gunzipping when the name ends in `.gz`.
/// A document without a schema version is rejected.
pub fn load(path: &Utf8Path) -> Result<ScanResult> {
    load_impl(path).with_context(|| format!("cannot load scan file \"{path}\""))
}

/// Load a previous scan for use as a cache: on top of [`load`], the tree
/// must pass [`cache::validate`]. The root-name check against the new scan
/// root happens in [`crate::scan::scan`].
pub fn load_cache(path: &Utf8Path) -> Result<ScanResult> {
    load_cache_impl(path).with_context(|| format!("cannot load scan cache file \"{path}\""))
}

fn load_cache_impl(path: &Utf8Path) -> Result<ScanResult> {
    let result = load_impl(path)?;
    cache::validate(&result)?;
    Ok(result)
}

fn load_impl(path: &Utf8Path) -> Result<ScanResult> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let result: ScanResult = if is_gzipped(path) {
        serde_json::from_reader(GzDecoder::new(reader))?
    } else {
        serde_json::from_reader(reader)?
    };
    if result.type_version == 0 {
        bail!("schema version missing");
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `result` as JSON to `path`, gzipping when the name ends in `.gz`.
pub fn save(result: &ScanResult, path: &Utf8Path) -> Result<()> {
    save_impl(result, path).with_context(|| format!("cannot write scan file \"{path}\""))
}

fn save_impl(result: &ScanResult, path: &Utf8Path) -> Result<()> {
    let file = fs::File::create(path)?;
    if is_gzipped(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_json(result, &mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_json(result, &mut writer)?;
        writer.flush()?;
    }
    Ok(())
}

/// Write `result` as JSON followed by a newline.
pub fn write_json<W: Write>(result: &ScanResult, writer: &mut W) -> Result<()> {
    serde_json::to_writer(&mut *writer, result)?;
    writer.write_all(b"\n")?;
    Ok(())
}
