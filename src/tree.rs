//! Canonical in-memory model of a scanned directory tree.
//!
//! Every `dirs` and `files` list is sorted ascending by name, no entry in
//! `files` has size 0, and no two entries within one directory share a name
//! across any of the five child lists. The append operations below do not
//! enforce ordering; producers (the scanner and the validated deserializer)
//! visit entries in lexical order, so the invariants hold by construction.

use serde::{Deserialize, Serialize};

/// Schema version written to every scan file. A loaded document with
/// version 0 (or no version field at all) is rejected.
pub const CURRENT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dir {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs: Vec<Dir>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub empty_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_dirs: Vec<String>,
}

/// A regular file with non-zero size. Zero-sized files are recorded by name
/// only, in [`Dir::empty_files`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub size: u64,
    /// Last modification time in seconds since the Unix epoch; 0 means
    /// unknown.
    pub mod_time: i64,
    /// FNV-1a/64 of the file contents. May be 0, meaning either "hashing
    /// failed" or "legitimately hashes to 0"; the two are indistinguishable
    /// and a 0 hash is always recomputed on the next scan.
    pub hash: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub type_version: u32,
    pub root: Dir,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Dir {
    pub fn new(name: impl Into<String>) -> Dir {
        Dir {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_dir(&mut self, dir: Dir) {
        self.dirs.push(dir);
    }

    pub fn add_file(&mut self, file: File) {
        self.files.push(file);
    }

    pub fn add_empty_file(&mut self, name: impl Into<String>) {
        self.empty_files.push(name.into());
    }

    pub fn add_skipped_file(&mut self, name: impl Into<String>) {
        self.skipped_files.push(name.into());
    }

    pub fn add_skipped_dir(&mut self, name: impl Into<String>) {
        self.skipped_dirs.push(name.into());
    }

    /// Number of hashed (non-empty, non-skipped) files in this subtree.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.iter().map(Dir::file_count).sum::<usize>()
    }

    /// Total size in bytes of the hashed files in this subtree.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum::<u64>()
            + self.dirs.iter().map(Dir::total_size).sum::<u64>()
    }
}

impl File {
    pub fn new(name: impl Into<String>, size: u64, mod_time: i64, hash: u64) -> File {
        File {
            name: name.into(),
            size,
            mod_time,
            hash,
        }
    }
}

impl ScanResult {
    pub fn new(root: Dir) -> ScanResult {
        ScanResult {
            type_version: CURRENT_VERSION,
            root,
        }
    }
}
