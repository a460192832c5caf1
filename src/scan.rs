//! Cache-aware recursive directory scanner.
//!
//! The walk visits entries in lexical order by name, depth-first, parent
//! before children, so the emitted tree satisfies the ordering invariants of
//! [`crate::tree`] without a post-sort. Each recursion frame carries the
//! `Dir` under construction and the matching cache subtree, so cache lookups
//! stay O(log fan-out) per file.
//!
//! Failure policy: a file that cannot be hashed is recorded with hash 0, an
//! entry or directory that cannot be accessed is logged and absorbed, and a
//! path that vanishes mid-walk is logged and ignored. Everything else aborts
//! the scan.

use anyhow::{anyhow, bail, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

use crate::cache;
use crate::hash;
use crate::skip::Skip;
use crate::tree::{Dir, File, ScanResult};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Walk `root` and produce its content inventory.
///
/// `cache` is the root of a previous scan of the same directory; a file
/// whose name and size match a cached entry reuses the cached hash instead
/// of being re-read. The cache must already be validated (see
/// [`cache::validate`]); its root name must equal the base name of `root`.
///
/// A symlinked root is followed (the walk operates on the real directory)
/// but the result keeps the symlink's own base name as the root name.
pub fn scan(root: &Path, skip: &Skip, cache: Option<&Dir>) -> Result<ScanResult> {
    let name = base_name(root);
    let parent = root.parent().unwrap_or_else(|| Path::new(""));
    if skip.should_skip(parent, &name) {
        bail!("root directory {root:?} is excluded by the skip expression");
    }
    if let Some(cache_root) = cache {
        if cache_root.name != name {
            bail!(
                "cache root {:?} does not match root directory name {:?}",
                cache_root.name,
                name
            );
        }
    }
    let resolved = resolve_root(root)?;

    let mut root_dir = Dir::new(name.as_str());
    match list_sorted(&resolved) {
        Ok(entries) => scan_children(&resolved, entries, &mut root_dir, cache, skip)?,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            // The root is expected to be readable; record the scan as empty
            // rather than failing outright.
            warn!("skipping inaccessible directory {resolved:?}");
        }
        Err(e) => return Err(anyhow!(e).context(format!("cannot walk directory {resolved:?}"))),
    }
    Ok(ScanResult::new(root_dir))
}

// ---------------------------------------------------------------------------
// Preflight
// ---------------------------------------------------------------------------

fn base_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        // No final component ("/", "..", ...); fall back to the path itself.
        None => path.to_string_lossy().into_owned(),
    }
}

fn resolve_root(root: &Path) -> Result<PathBuf> {
    let meta = fs::symlink_metadata(root).map_err(|e| invalid_root(root, e))?;
    let resolved = if meta.is_symlink() {
        let resolved = fs::canonicalize(root).map_err(|e| invalid_root(root, e))?;
        info!("following root symlink {root:?} to {resolved:?}");
        resolved
    } else {
        root.to_path_buf()
    };
    let meta = fs::metadata(&resolved).map_err(|e| invalid_root(&resolved, e))?;
    if !meta.is_dir() {
        bail!("root {root:?} is not a directory");
    }
    Ok(resolved)
}

fn invalid_root(root: &Path, e: io::Error) -> anyhow::Error {
    match e.kind() {
        io::ErrorKind::NotFound => anyhow!("root directory {root:?} was not found"),
        io::ErrorKind::PermissionDenied => anyhow!("access to root directory {root:?} was denied"),
        _ => anyhow!(e).context(format!("cannot resolve root directory {root:?}")),
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

fn list_sorted(path: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(path)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn scan_children(
    path: &Path,
    entries: Vec<fs::DirEntry>,
    dir: &mut Dir,
    cache_dir: Option<&Dir>,
    skip: &Skip,
) -> Result<()> {
    for entry in entries {
        let entry_path = entry.path();
        let name_os = entry.file_name();
        let Some(name) = name_os.to_str() else {
            warn!("skipping entry {entry_path:?} with a non-UTF-8 name during scan");
            continue;
        };

        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    warn!("skipping inaccessible entry {entry_path:?}");
                    continue;
                }
                io::ErrorKind::NotFound => {
                    error!("entry {entry_path:?} vanished during scan");
                    continue;
                }
                _ => return Err(anyhow!(e).context(format!("cannot walk entry {entry_path:?}"))),
            },
        };

        if skip.should_skip(path, name) {
            if file_type.is_dir() {
                debug!("skipping directory {entry_path:?}");
                dir.add_skipped_dir(name);
            } else {
                debug!("skipping file {entry_path:?}");
                dir.add_skipped_file(name);
            }
            continue;
        }

        if file_type.is_dir() {
            scan_subdir(&entry_path, name, dir, cache_dir, skip)?;
        } else if file_type.is_file() {
            scan_file(&entry_path, name, &entry, dir, cache_dir)?;
        } else if file_type.is_symlink() {
            info!("skipping symlink {entry_path:?} during scan");
        } else {
            info!("skipping irregular file {entry_path:?} during scan");
        }
    }
    Ok(())
}

fn scan_subdir(
    path: &Path,
    name: &str,
    parent: &mut Dir,
    cache_dir: Option<&Dir>,
    skip: &Skip,
) -> Result<()> {
    match list_sorted(path) {
        Ok(entries) => {
            let mut child = Dir::new(name);
            let child_cache = cache_dir.and_then(|c| cache::find_subdir(c, name));
            scan_children(path, entries, &mut child, child_cache, skip)?;
            parent.add_dir(child);
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!("skipping inaccessible directory {path:?}");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            error!("directory {path:?} vanished during scan");
        }
        Err(e) => return Err(anyhow!(e).context(format!("cannot walk directory {path:?}"))),
    }
    Ok(())
}

fn scan_file(
    path: &Path,
    name: &str,
    entry: &fs::DirEntry,
    parent: &mut Dir,
    cache_dir: Option<&Dir>,
) -> Result<()> {
    let meta = match entry.metadata() {
        Ok(m) => m,
        Err(e) => match e.kind() {
            io::ErrorKind::PermissionDenied => {
                warn!("skipping inaccessible file {path:?}");
                return Ok(());
            }
            io::ErrorKind::NotFound => {
                error!("file {path:?} vanished during scan");
                return Ok(());
            }
            _ => return Err(anyhow!(e).context(format!("cannot walk file {path:?}"))),
        },
    };

    let size = meta.len();
    if size == 0 {
        parent.add_empty_file(name);
        return Ok(());
    }

    let mod_time = mod_time_secs(&meta);
    let file_hash = match cache::hash_from_cache(cache_dir, name, size, mod_time) {
        Some(h) => {
            debug!("hash of file {path:?} found in cache");
            h
        }
        None => match hash::hash_file(path) {
            Ok(0) => {
                warn!("freshly computed hash of file {path:?} is 0");
                0
            }
            Ok(h) => h,
            // Not fatal: keep the file's metadata so a future comparison can
            // still see it, with hash 0 marking "unknown contents".
            Err(e) => {
                error!("cannot hash file {path:?}: {e:#}");
                0
            }
        },
    };
    parent.add_file(File::new(name, size, mod_time, file_hash));
    Ok(())
}

fn mod_time_secs(meta: &fs::Metadata) -> i64 {
    let Ok(mod_time) = meta.modified() else {
        return 0;
    };
    match mod_time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
