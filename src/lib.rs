pub mod cache;
pub mod cmd;
pub mod hash;
pub mod index;
pub mod logging;
pub mod matching;
pub mod scan;
pub mod scanfile;
pub mod skip;
pub mod tree;
pub mod util;

pub use matching::{MatchResult, Target};
pub use scan::scan;
pub use tree::{Dir, File, ScanResult};

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;
