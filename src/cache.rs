//! Validation and lookup of a previous scan used as a hash cache.
//!
//! Lookup walks `dirs` and `files` by binary search, so a cache is only
//! usable if those lists are sorted. A freshly scanned tree is sorted by
//! construction; a loaded one must pass [`validate`] first. The ordering of
//! `empty_files`, `skipped_files` and `skipped_dirs` is irrelevant to
//! lookup and is not checked.

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::tree::{Dir, ScanResult, CURRENT_VERSION};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that a loaded scan result can serve as a cache: the schema version
/// must be current and the tree must satisfy the ordering and naming
/// invariants that lookup relies on. Reports the first violation, with a
/// breadcrumb trail of `in subdirectory ...` wrappers for nested failures.
pub fn validate(result: &ScanResult) -> Result<()> {
    if result.type_version == 0 {
        bail!("schema version missing");
    }
    if result.type_version != CURRENT_VERSION {
        bail!(
            "unsupported schema version {} (current version is {})",
            result.type_version,
            CURRENT_VERSION
        );
    }
    validate_dir(&result.root).context("invalid root")
}

fn validate_dir(dir: &Dir) -> Result<()> {
    if dir.name.is_empty() {
        bail!("directory has no name");
    }

    for (i, sub) in dir.dirs.iter().enumerate() {
        if i > 0 && sub.name <= dir.dirs[i - 1].name {
            bail!(
                "list of subdirectories of {:?} is not sorted: {:?} on index {} should come before {:?} on index {}",
                dir.name,
                sub.name,
                i,
                dir.dirs[i - 1].name,
                i - 1
            );
        }
    }

    for (i, file) in dir.files.iter().enumerate() {
        if file.name.is_empty() {
            bail!("file on index {i} has no name");
        }
        if file.size == 0 {
            bail!("file {:?} on index {} has size 0", file.name, i);
        }
        if i > 0 && file.name <= dir.files[i - 1].name {
            bail!(
                "list of files of {:?} is not sorted: {:?} on index {} should come before {:?} on index {}",
                dir.name,
                file.name,
                i,
                dir.files[i - 1].name,
                i - 1
            );
        }
        if file.hash == 0 {
            warn!(
                "cached file {:?} in directory {:?} has hash 0; this hash will be recomputed",
                file.name, dir.name
            );
        }
    }

    for (i, sub) in dir.dirs.iter().enumerate() {
        validate_dir(sub)
            .with_context(|| format!("in subdirectory {:?} on index {}", sub.name, i))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Locate a child directory by name. `dirs` is sorted, so this is a binary
/// search.
pub fn find_subdir<'a>(dir: &'a Dir, name: &str) -> Option<&'a Dir> {
    dir.dirs
        .binary_search_by(|d| d.name.as_str().cmp(name))
        .ok()
        .map(|i| &dir.dirs[i])
}

/// Look up the cached hash for `name`.
///
/// A hit requires the name to be present and the cached size to equal the
/// probe size; a cached hash of 0 is a miss. `mod_time` is recorded
/// metadata only and does not participate in the match: a cache entry with
/// matching size but a different modification time is still used.
pub fn hash_from_cache(dir: Option<&Dir>, name: &str, size: u64, _mod_time: i64) -> Option<u64> {
    let dir = dir?;
    let file = dir
        .files
        .binary_search_by(|f| f.name.as_str().cmp(name))
        .ok()
        .map(|i| &dir.files[i])?;
    if file.size != size || file.hash == 0 {
        return None;
    }
    Some(file.hash)
}
