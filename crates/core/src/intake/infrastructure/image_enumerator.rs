use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::shared::constants::IMAGE_EXTENSIONS;

/// Recursively lists candidate images under `root`, sorted by file name
/// within each directory.
///
/// Lazy: nothing is read until the iterator is advanced, and calling this
/// again starts a fresh walk. Hidden files and folders are skipped.
/// Unreadable entries are logged and skipped.
pub fn enumerate(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_image_extension(e.path()))
        .map(DirEntry::into_path)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}
