//! 64-bit FNV-1a content fingerprinting.
//!
//! FNV-1a is fast, deterministic, and cheap to stream. It is not a
//! cryptographic digest: collisions are possible and accepted. Match output
//! is a candidate list, not proof of byte equality, and a downstream
//! byte-comparison step can weed out false positives.

use anyhow::{Context, Result};
use fnv::FnvHasher;
use std::fs;
use std::hash::Hasher;
use std::io::{BufReader, Read};
use std::path::Path;

const READ_BUF_SIZE: usize = 64 * 1024;

/// Hash all bytes from `reader`, returning the FNV-1a/64 digest and the
/// total number of bytes consumed.
pub fn hash_stream<R: Read>(reader: &mut R) -> Result<(u64, u64)> {
    let mut hasher = FnvHasher::default();
    let mut buf = [0u8; READ_BUF_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("read error after {total} bytes"))?;
        if n == 0 {
            break;
        }
        hasher.write(&buf[..n]);
        total += n as u64;
    }
    Ok((hasher.finish(), total))
}

/// Hash the contents of the file at `path`.
///
/// The file is opened read-only and closed on every exit path. An error
/// chain starting with "cannot open" means the file was inaccessible;
/// "cannot read" means the open succeeded but streaming failed.
pub fn hash_file(path: &Path) -> Result<u64> {
    let file = fs::File::open(path).with_context(|| format!("cannot open file {path:?}"))?;
    let mut reader = BufReader::new(file);
    let (hash, _) = hash_stream(&mut reader).with_context(|| format!("cannot read file {path:?}"))?;
    Ok(hash)
}

/// Hash an in-memory byte sequence. Cannot fail.
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(bytes);
    hasher.finish()
}
