//! Extension include/exclude filtering
//!
//! The filter is a pure predicate and is applied identically during
//! enumeration for backup, restore, clean and list, so that all operations
//! agree on the universe of managed files.

use std::collections::HashSet;

/// Include/exclude filter over case-insensitive file extensions
///
/// An item passes iff its extension is not in `exclude` AND (`include` is
/// empty OR its extension is in `include`). An extension present in both
/// sets is excluded.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from raw extension lists (with or without leading dots)
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        Self {
            include: include.into_iter().filter_map(normalize_ext).collect(),
            exclude: exclude.into_iter().filter_map(normalize_ext).collect(),
        }
    }

    /// True when no extensions are included or excluded
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Apply the predicate to a relative path or object key
    pub fn matches(&self, key: &str) -> bool {
        let ext = extension_of(key);
        !self.exclude.contains(&ext) && (self.include.is_empty() || self.include.contains(&ext))
    }
}

/// Lowercased extension of a path, including the dot; empty if there is none
///
/// Only the final path component is considered, so `dir.v2/readme` has no
/// extension.
pub fn extension_of(key: &str) -> String {
    let name = key.rsplit(['/', '\\']).next().unwrap_or(key);
    match name.rfind('.') {
        Some(pos) => name[pos..].to_ascii_lowercase(),
        None => String::new(),
    }
}

fn normalize_ext(raw: String) -> Option<String> {
    let trimmed = raw.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('.') {
        Some(trimmed)
    } else {
        Some(format!(".{trimmed}"))
    }
}
