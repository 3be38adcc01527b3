//! Local filesystem enumeration
//!
//! Materializes the backup candidate list once per run; there is no
//! incremental re-scan.

use std::path::Path;

use jiff::Timestamp;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::filter::ExtensionFilter;
use crate::item::LocalItem;

/// Recursively enumerate files under `root`, applying the extension filter
///
/// Relative paths are slash-normalized and never contain the root prefix.
/// Symlinks are not followed.
pub fn scan_tree(root: &Path, filter: &ExtensionFilter) -> Result<Vec<LocalItem>> {
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "source path '{}' is not a directory",
            root.display()
        )));
    }

    let mut items = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::Io(std::io::Error::other("filesystem loop detected")),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if !filter.matches(&relative) {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| match e.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::Io(std::io::Error::other("unreadable metadata")),
        })?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| Timestamp::try_from(t).ok());

        items.push(LocalItem {
            relative,
            absolute: entry.path().to_path_buf(),
            size_bytes: metadata.len(),
            modified,
        });
    }

    Ok(items)
}
