//! Single-level directory scanning.
//!
//! Enumerates the direct children of one directory and classifies each as a
//! directory or a file, with one `file_type` lookup per child. Never
//! recurses. Results keep whatever order the OS yields from `read_dir`;
//! nothing here sorts.

use std::io;
use std::path::Path;

/// A direct child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    pub name: String,
    pub is_dir: bool,
}

/// List the direct children of `path`.
///
/// Entries with non-UTF-8 names are skipped; they cannot be represented in
/// the JSON API.
pub async fn scan_dir(path: &Path) -> Result<Vec<ScannedEntry>, io::Error> {
    let mut reader = tokio::fs::read_dir(path).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let file_type = entry.file_type().await?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!("skipping non-UTF-8 entry {:?} in {}", raw, path.display());
                continue;
            }
        };
        entries.push(ScannedEntry {
            name,
            is_dir: file_type.is_dir(),
        });
    }

    Ok(entries)
}
