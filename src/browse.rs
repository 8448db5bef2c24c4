//! Folder-grouped view of a flat listing.
//! Purely a display concern: a key's folder label is everything before its last
//! `/`, which has nothing to do with the prefixes the rename engine works on.

use std::collections::BTreeMap;

use crate::store::ObjectEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderView {
    /// Keys without any `/`.
    pub root_files: Vec<ObjectEntry>,
    /// Folder label -> entries directly labelled with it, in listing order.
    pub folders: BTreeMap<String, Vec<ObjectEntry>>,
}

impl FolderView {
    pub fn from_entries(entries: impl IntoIterator<Item = ObjectEntry>) -> Self {
        let mut view = FolderView::default();
        for entry in entries {
            match entry.key.rsplit_once('/') {
                Some((folder, _)) => view
                    .folders
                    .entry(folder.to_string())
                    .or_default()
                    .push(entry),
                None => view.root_files.push(entry),
            }
        }
        view
    }

    /// Number of files across root and every folder.
    pub fn total_files(&self) -> usize {
        self.root_files.len() + self.folders.values().map(Vec::len).sum::<usize>()
    }

    /// Sum of known sizes.
    pub fn total_bytes(&self) -> u64 {
        self.root_files
            .iter()
            .chain(self.folders.values().flatten())
            .filter_map(|e| e.size)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.root_files.is_empty() && self.folders.is_empty()
    }
}

/// Last path segment, for display.
pub fn file_label(key: &str) -> &str {
    match key.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "Unnamed file",
    }
}

/// Human-readable byte count (B, KB, MB, GB).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
