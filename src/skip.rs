//! Skip expressions: which base names a scan should leave out.
//!
//! An expression is either a comma-separated list of base names, or
//! `@<file>` naming a file with one base name per non-empty line. Parsing
//! and validation happen before any scan IO; the resulting predicate is a
//! pure set-membership test and never touches the filesystem.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Longest accepted line in a `@<file>` skip list.
const MAX_LINE_LEN: usize = 256;

/// Predicate over (parent path, base name) deciding whether the scanner
/// should descend into or record an entry.
#[derive(Clone, Debug, Default)]
pub struct Skip {
    names: HashSet<String>,
}

impl Skip {
    /// The predicate that skips nothing.
    pub fn none() -> Skip {
        Skip::default()
    }

    /// Skip entries whose base name is one of `names`. Names are not
    /// validated; use [`parse`] for user input.
    pub fn from_names<I, S>(names: I) -> Skip
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Skip {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn should_skip(&self, _parent: &Path, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Expression parsing
// ---------------------------------------------------------------------------

/// Parse a skip expression. The empty expression skips nothing.
pub fn parse(expr: &str) -> Result<Skip> {
    if expr.is_empty() {
        return Ok(Skip::none());
    }
    if let Some(path) = expr.strip_prefix('@') {
        return parse_file(Path::new(path))
            .with_context(|| format!("cannot load skip names from {path:?}"));
    }

    let mut names = HashSet::new();
    for name in expr.split(',') {
        validate_name(name)?;
        names.insert(name.to_owned());
    }
    Ok(Skip { names })
}

fn parse_file(path: &Path) -> Result<Skip> {
    let contents = fs::read_to_string(path)?;
    let mut names = HashSet::new();
    for (i, line) in contents.lines().enumerate() {
        if line.len() > MAX_LINE_LEN {
            bail!(
                "line {} is too long ({} bytes; the maximum is {})",
                i + 1,
                line.len(),
                MAX_LINE_LEN
            );
        }
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        validate_name(name).with_context(|| format!("on line {}", i + 1))?;
        names.insert(name.to_owned());
    }
    Ok(Skip { names })
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("skip name is empty");
    }
    if name.trim() != name {
        bail!("skip name {name:?} has surrounding whitespace");
    }
    if name == "." || name == ".." {
        bail!("skip name {name:?} is not allowed");
    }
    for c in ['/', std::path::MAIN_SEPARATOR, '*', '?'] {
        if name.contains(c) {
            bail!("skip name {name:?} contains illegal character {c:?}");
        }
    }
    Ok(())
}
