// ----------------------------------------------------------------------------
// Declarations
// ----------------------------------------------------------------------------

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::time::Duration;

/// Normalize backslashes to forward slashes.
pub trait SlashFix {
    fn slash_fix(self) -> Self;
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl SlashFix for Utf8PathBuf {
    fn slash_fix(self) -> Self {
        self.into_string().slash_fix().into()
    }
}

impl SlashFix for String {
    fn slash_fix(self) -> Self {
        self.replace('\\', "/")
    }
}

/// Lexically clean a path: drop `.` components, collapse `<dir>/..` pairs,
/// keep leading `..` components that cannot be resolved. The empty path
/// cleans to `.`.
pub fn clean_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                // ".." directly under the root stays at the root.
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                _ => parts.push(comp),
            },
            _ => parts.push(comp),
        }
    }
    if parts.is_empty() {
        return Utf8PathBuf::from(".");
    }
    let mut cleaned = Utf8PathBuf::new();
    for part in parts {
        cleaned.push(part.as_str());
    }
    cleaned
}

/// Format a duration for log lines: milliseconds under a second, one
/// decimal of seconds under a minute, minutes and seconds above.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
