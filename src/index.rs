//! Inverse index over a scanned tree: hash → file locations.
//!
//! Directory nodes live in an arena and point back to their parents by
//! index, so a matched file's full path can be reconstructed without storing
//! path strings per file. The parent chain terminates at the tree root,
//! whose node has no parent.

use std::collections::HashMap;

use crate::tree::{Dir, File};

struct DirNode<'a> {
    name: &'a str,
    parent: Option<usize>,
}

/// Location of one indexed file: the scan node plus the arena slot of its
/// containing directory.
pub struct FileLoc<'a> {
    pub file: &'a File,
    dir: usize,
}

/// Map from content hash to every file in one scanned tree with that hash.
/// Bucket order is the depth-first visit order of the tree: a directory's
/// files first, then its subdirectories.
pub struct TargetIndex<'a> {
    nodes: Vec<DirNode<'a>>,
    by_hash: HashMap<u64, Vec<FileLoc<'a>>>,
}

impl<'a> TargetIndex<'a> {
    pub fn build(root: &'a Dir) -> TargetIndex<'a> {
        let mut index = TargetIndex {
            nodes: Vec::new(),
            by_hash: HashMap::new(),
        };
        index.add_dir(root, None);
        index
    }

    fn add_dir(&mut self, dir: &'a Dir, parent: Option<usize>) {
        let node = self.nodes.len();
        self.nodes.push(DirNode {
            name: &dir.name,
            parent,
        });
        for file in &dir.files {
            self.by_hash
                .entry(file.hash)
                .or_default()
                .push(FileLoc { file, dir: node });
        }
        for sub in &dir.dirs {
            self.add_dir(sub, Some(node));
        }
    }

    pub fn get(&self, hash: u64) -> Option<&[FileLoc<'a>]> {
        self.by_hash.get(&hash).map(Vec::as_slice)
    }

    /// Render a location as `<root>/<dir>/.../<name>`, `/`-separated on
    /// every host. The root's own name is the first segment.
    pub fn render_path(&self, loc: &FileLoc<'a>) -> String {
        let mut segments = vec![loc.file.name.as_str()];
        let mut cur = Some(loc.dir);
        while let Some(i) = cur {
            segments.push(self.nodes[i].name);
            cur = self.nodes[i].parent;
        }
        segments.reverse();
        segments.join("/")
    }
}
