//! Output layout: one folder per identity directly under the output root.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::region::Region;

/// What gets saved for an assigned face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStyle {
    /// Copy the whole original file under its own name.
    Copy,
    /// Save an aligned face chip named `<stem>_face_<x>_<y><ext>`.
    /// Both names are prefixed with the source's folders below the input
    /// root, see [`folder_prefix`].
    Crop,
}

impl fmt::Display for PlacementStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementStyle::Copy => write!(f, "copy"),
            PlacementStyle::Crop => write!(f, "crop"),
        }
    }
}

impl FromStr for PlacementStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "copy" => Ok(PlacementStyle::Copy),
            "crop" => Ok(PlacementStyle::Crop),
            other => Err(format!("placement must be 'copy' or 'crop', got '{other}'")),
        }
    }
}

/// Folder for `label` under `output_root`.
pub fn identity_folder(output_root: &Path, label: &str) -> PathBuf {
    output_root.join(folder_name(label))
}

/// Makes a label safe to use as a single path component.
pub fn folder_name(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Folders between `input_root` and `source`, each followed by `_`.
///
/// Photos sharing a file name in different input folders get distinct
/// output names this way, and the name stays the same on every run. Empty
/// for files directly under `input_root` or outside it.
pub fn folder_prefix(input_root: &Path, source: &Path) -> String {
    let Some(relative) = source
        .parent()
        .and_then(|parent| parent.strip_prefix(input_root).ok())
    else {
        return String::new();
    };
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(format!("{}_", name.to_string_lossy())),
            _ => None,
        })
        .collect()
}

/// Output name for a full copy of `source`.
pub fn copy_file_name(input_root: &Path, source: &Path) -> Option<String> {
    let name = source.file_name()?.to_string_lossy();
    Some(format!("{}{name}", folder_prefix(input_root, source)))
}

/// `<stem>_face_<x>_<y><ext>` for a face at `region` in `source`.
pub fn chip_file_name(input_root: &Path, source: &Path, region: &Region) -> Option<String> {
    let stem = source.file_stem()?.to_string_lossy();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    Some(format!(
        "{}{stem}_face_{}_{}{ext}",
        folder_prefix(input_root, source),
        region.x,
        region.y
    ))
}

/// Where a face from `source` lands for `label`.
pub fn target_path(
    output_root: &Path,
    input_root: &Path,
    label: &str,
    source: &Path,
    region: &Region,
    style: PlacementStyle,
) -> Option<PathBuf> {
    let name = match style {
        PlacementStyle::Copy => copy_file_name(input_root, source)?,
        PlacementStyle::Crop => chip_file_name(input_root, source, region)?,
    };
    Some(identity_folder(output_root, label).join(name))
}
