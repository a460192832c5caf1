use std::fs;
use std::path::Path;

use crate::hash::hash_bytes;
use crate::scan::scan;
use crate::skip::{self, Skip};
use crate::tree::{Dir, File, ScanResult};
use crate::assert_err;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tmp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

fn base_name(path: &Path) -> &str {
    path.file_name().unwrap().to_str().unwrap()
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// The fixture tree used throughout:
///   a ("x\n"), c ("y\n"), b/d ("x\n"), e/f/a ("z\n"), e/f/g (empty)
fn build_fixture(root: &Path) {
    write_file(&root.join("a"), "x\n");
    write_file(&root.join("c"), "y\n");
    write_file(&root.join("b").join("d"), "x\n");
    write_file(&root.join("e").join("f").join("a"), "z\n");
    write_file(&root.join("e").join("f").join("g"), "");
}

fn dir_names(dir: &Dir) -> Vec<&str> {
    dir.dirs.iter().map(|d| d.name.as_str()).collect()
}

fn file_names(dir: &Dir) -> Vec<&str> {
    dir.files.iter().map(|f| f.name.as_str()).collect()
}

/// Recursively assert the structural guarantees every scan must uphold:
/// sorted child lists, non-empty names, positive sizes, and no name reuse
/// across any of the five child lists of one directory.
fn assert_tree_invariants(dir: &Dir) {
    assert!(!dir.name.is_empty());
    for pair in dir.dirs.windows(2) {
        assert!(pair[0].name < pair[1].name, "dirs unsorted in {:?}", dir.name);
    }
    for pair in dir.files.windows(2) {
        assert!(pair[0].name < pair[1].name, "files unsorted in {:?}", dir.name);
    }
    for file in &dir.files {
        assert!(!file.name.is_empty());
        assert!(file.size > 0);
    }

    let mut names: Vec<&str> = dir
        .dirs
        .iter()
        .map(|d| d.name.as_str())
        .chain(dir.files.iter().map(|f| f.name.as_str()))
        .chain(dir.empty_files.iter().map(String::as_str))
        .chain(dir.skipped_files.iter().map(String::as_str))
        .chain(dir.skipped_dirs.iter().map(String::as_str))
        .collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total, "name reused within {:?}", dir.name);

    for sub in &dir.dirs {
        assert_tree_invariants(sub);
    }
}

// ---------------------------------------------------------------------------
// Basic scanning
// ---------------------------------------------------------------------------

#[test]
fn scan_empty_dir() {
    let dir = tmp_dir();
    let result = scan(dir.path(), &Skip::none(), None).unwrap();
    assert_eq!(result, ScanResult::new(Dir::new(base_name(dir.path()))));
}

#[test]
fn scan_emits_sorted_lists() {
    let dir = tmp_dir();
    let root = dir.path();
    write_file(&root.join("c"), "1");
    write_file(&root.join("a"), "2");
    write_file(&root.join("b"), "3");
    fs::create_dir(root.join("z")).unwrap();
    fs::create_dir(root.join("y")).unwrap();

    let result = scan(root, &Skip::none(), None).unwrap();
    assert_eq!(file_names(&result.root), ["a", "b", "c"]);
    assert_eq!(dir_names(&result.root), ["y", "z"]);
}

#[test]
fn scan_records_file_metadata() {
    let dir = tmp_dir();
    write_file(&dir.path().join("data"), "y\n");

    let result = scan(dir.path(), &Skip::none(), None).unwrap();
    let file = &result.root.files[0];
    assert_eq!(file.name, "data");
    assert_eq!(file.size, 2);
    assert_eq!(file.hash, 643306694336204474);
    // Written just now, so well past 2020-01-01.
    assert!(file.mod_time > 1_577_836_800, "mod_time = {}", file.mod_time);
}

#[test]
fn scan_records_empty_files_separately() {
    let dir = tmp_dir();
    write_file(&dir.path().join("empty"), "");
    write_file(&dir.path().join("full"), "data");

    let result = scan(dir.path(), &Skip::none(), None).unwrap();
    assert_eq!(result.root.empty_files, ["empty"]);
    assert_eq!(file_names(&result.root), ["full"]);
}

#[test]
fn scan_skip_by_name() {
    let dir = tmp_dir();
    let root = dir.path();
    build_fixture(root);

    let skip = skip::parse("a").unwrap();
    let result = scan(root, &skip, None).unwrap();
    let top = &result.root;

    assert_eq!(dir_names(top), ["b", "e"]);
    assert_eq!(file_names(top), ["c"]);
    assert_eq!(top.files[0].size, 2);
    assert_eq!(top.files[0].hash, 643306694336204474);
    assert_eq!(top.skipped_files, ["a"]);
    assert!(top.skipped_dirs.is_empty());

    let b = &top.dirs[0];
    assert_eq!(file_names(b), ["d"]);
    assert_eq!(b.files[0].hash, hash_bytes(b"x\n"));

    let f = &top.dirs[1].dirs[0];
    assert_eq!(f.name, "f");
    assert!(f.files.is_empty());
    assert_eq!(f.empty_files, ["g"]);
    assert_eq!(f.skipped_files, ["a"]);
}

#[test]
fn scan_skips_directories_without_descending() {
    let dir = tmp_dir();
    let root = dir.path();
    write_file(&root.join("sub").join("inner"), "data");

    let skip = skip::parse("sub").unwrap();
    let result = scan(root, &skip, None).unwrap();
    assert!(result.root.dirs.is_empty());
    assert_eq!(result.root.skipped_dirs, ["sub"]);
}

#[test]
fn scan_sorts_byte_lexically() {
    // Plain byte order: uppercase before lowercase.
    let dir = tmp_dir();
    let root = dir.path();
    for name in ["b", "B", "a", "Z"] {
        write_file(&root.join(name), "1");
    }

    let result = scan(root, &Skip::none(), None).unwrap();
    assert_eq!(file_names(&result.root), ["B", "Z", "a", "b"]);
}

#[test]
fn scan_upholds_tree_invariants() {
    let dir = tmp_dir();
    let root = dir.path();
    build_fixture(root);
    write_file(&root.join("e").join("extra"), "more\n");
    write_file(&root.join("b").join("sub").join("deep"), "deep\n");
    write_file(&root.join("b").join("hollow"), "");

    let skip = skip::parse("g,sub").unwrap();
    let result = scan(root, &skip, None).unwrap();
    assert_tree_invariants(&result.root);

    // A fresh scan is always usable as a cache.
    crate::cache::validate(&result).unwrap();
}

#[test]
fn scan_counts_files_and_bytes() {
    let dir = tmp_dir();
    let root = dir.path();
    build_fixture(root);

    let result = scan(root, &Skip::none(), None).unwrap();
    // a, c, b/d, e/f/a; the empty e/f/g is not counted.
    assert_eq!(result.root.file_count(), 4);
    assert_eq!(result.root.total_size(), 8);
}

// ---------------------------------------------------------------------------
// Preflight failures
// ---------------------------------------------------------------------------

#[test]
fn scan_rejects_skipped_root() {
    let dir = tmp_dir();
    let skip = Skip::from_names([base_name(dir.path())]);
    let result = scan(dir.path(), &skip, None);
    assert_err!(result);
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("excluded by the skip expression"), "unexpected error: {message}");
}

#[test]
fn scan_rejects_cache_root_mismatch() {
    let dir = tmp_dir();
    let cache = Dir::new("somewhere-else");
    let result = scan(dir.path(), &Skip::none(), Some(&cache));
    assert_err!(result);
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("does not match"), "unexpected error: {message}");
}

#[test]
fn scan_rejects_missing_root() {
    let dir = tmp_dir();
    let result = scan(&dir.path().join("nope"), &Skip::none(), None);
    assert_err!(result);
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("was not found"), "unexpected error: {message}");
}

#[test]
fn scan_rejects_file_root() {
    let dir = tmp_dir();
    let path = dir.path().join("plain");
    write_file(&path, "data");
    let result = scan(&path, &Skip::none(), None);
    assert_err!(result);
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("is not a directory"), "unexpected error: {message}");
}

// ---------------------------------------------------------------------------
// Cache interaction
// ---------------------------------------------------------------------------

#[test]
fn scan_cache_hit() {
    let dir = tmp_dir();
    let root = dir.path();
    build_fixture(root);

    // Cache entries for c and e/f/a with sentinel hashes; a and b/d are
    // absent and must be hashed fresh.
    let mut cache = Dir::new(base_name(root));
    cache.add_file(File::new("c", 2, 0, 53));
    let mut f = Dir::new("f");
    f.add_file(File::new("a", 2, 0, 42));
    let mut e = Dir::new("e");
    e.add_dir(f);
    cache.add_dir(e);

    let result = scan(root, &Skip::none(), Some(&cache)).unwrap();
    let top = &result.root;

    assert_eq!(file_names(top), ["a", "c"]);
    assert_eq!(top.files[0].hash, hash_bytes(b"x\n"));
    assert_eq!(top.files[1].hash, 53);
    assert_eq!(top.dirs[0].files[0].hash, hash_bytes(b"x\n"));
    assert_eq!(top.dirs[1].dirs[0].files[0].hash, 42);
}

#[test]
fn scan_cache_size_mismatch_recomputes() {
    let dir = tmp_dir();
    let root = dir.path();
    write_file(&root.join("c"), "y\n");

    let mut cache = Dir::new(base_name(root));
    cache.add_file(File::new("c", 3, 0, 53));

    let result = scan(root, &Skip::none(), Some(&cache)).unwrap();
    assert_eq!(result.root.files[0].hash, hash_bytes(b"y\n"));
}

#[test]
fn scan_cache_zero_hash_recomputes() {
    let dir = tmp_dir();
    let root = dir.path();
    write_file(&root.join("c"), "y\n");

    let mut cache = Dir::new(base_name(root));
    cache.add_file(File::new("c", 2, 0, 0));

    let result = scan(root, &Skip::none(), Some(&cache)).unwrap();
    assert_eq!(result.root.files[0].hash, hash_bytes(b"y\n"));
}

#[test]
fn scan_cache_mod_time_mismatch_still_hits() {
    let dir = tmp_dir();
    let root = dir.path();
    write_file(&root.join("c"), "y\n");

    // mod_time 1 can never match the real file; only size has to agree.
    let mut cache = Dir::new(base_name(root));
    cache.add_file(File::new("c", 2, 1, 53));

    let result = scan(root, &Skip::none(), Some(&cache)).unwrap();
    assert_eq!(result.root.files[0].hash, 53);
}

#[test]
fn scan_idempotent_with_fresh_cache() {
    let dir = tmp_dir();
    let root = dir.path();
    build_fixture(root);

    let first = scan(root, &Skip::none(), None).unwrap();
    let second = scan(root, &Skip::none(), Some(&first.root)).unwrap();
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Symlinks
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn scan_follows_symlinked_root_but_keeps_its_name() {
    let dir = tmp_dir();
    let real = dir.path().join("real");
    write_file(&real.join("data"), "y\n");
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let result = scan(&link, &Skip::none(), None).unwrap();
    assert_eq!(result.root.name, "link");
    assert_eq!(file_names(&result.root), ["data"]);
    assert_eq!(result.root.files[0].hash, 643306694336204474);
}

#[cfg(unix)]
#[test]
fn scan_skips_symlink_entries() {
    let dir = tmp_dir();
    let root = dir.path();
    write_file(&root.join("real"), "data");
    std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

    let result = scan(root, &Skip::none(), None).unwrap();
    assert_eq!(file_names(&result.root), ["real"]);
    assert!(result.root.dirs.is_empty());
    assert!(result.root.empty_files.is_empty());
}
