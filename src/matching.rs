//! Hash-keyed correlation of one source tree against target indexes.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

use crate::index::TargetIndex;
use crate::tree::Dir;

/// One match-run input: a caller-chosen stable id plus the inverse index of
/// a scanned tree. Ids must be unique across a run; the position of a target
/// in the input list is the numeric prefix of its rendered paths.
pub struct Target<'a> {
    pub id: String,
    pub index: TargetIndex<'a>,
}

impl<'a> Target<'a> {
    pub fn new(id: impl Into<String>, root: &'a Dir) -> Target<'a> {
        Target {
            id: id.into(),
            index: TargetIndex::build(root),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TargetInfo {
    pub id: String,
}

/// Result of one match run. `matches` maps the fingerprint `"<size>,<hash>"`
/// of each source file that has at least one target hit to the rendered
/// paths `"<target-index>:<dir>/.../<name>"` of those hits, in target order.
/// Key order is the source-tree visit order.
#[derive(Debug, Serialize)]
pub struct MatchResult {
    pub targets: Vec<TargetInfo>,
    pub matches: IndexMap<String, Vec<String>>,
}

/// Correlate every file under `src_root` against `targets`, in order.
///
/// Source files sharing a fingerprint are coalesced: the first occurrence
/// creates the bucket and later ones are skipped, since the bucket already
/// lists every target-side location of that content. Fingerprints with no
/// target hit are omitted entirely.
pub fn run(src_root: &Dir, targets: &[Target]) -> Result<MatchResult> {
    let mut ids = HashSet::new();
    for target in targets {
        if !ids.insert(target.id.as_str()) {
            bail!("duplicate target id {:?}", target.id);
        }
    }

    let mut matches = IndexMap::new();
    match_dir(src_root, targets, &mut matches);

    Ok(MatchResult {
        targets: targets
            .iter()
            .map(|t| TargetInfo { id: t.id.clone() })
            .collect(),
        matches,
    })
}

fn match_dir(dir: &Dir, targets: &[Target], matches: &mut IndexMap<String, Vec<String>>) {
    for file in &dir.files {
        let key = format!("{},{}", file.size, file.hash);
        if matches.contains_key(&key) {
            continue;
        }
        let mut found = Vec::new();
        for (i, target) in targets.iter().enumerate() {
            if let Some(locs) = target.index.get(file.hash) {
                for loc in locs {
                    found.push(format!("{}:{}", i, target.index.render_path(loc)));
                }
            }
        }
        if !found.is_empty() {
            matches.insert(key, found);
        }
    }
    for sub in &dir.dirs {
        match_dir(sub, targets, matches);
    }
}
