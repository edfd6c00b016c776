use std::path::{Path, PathBuf};

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_chip;
use crate::placement::domain::image_writer::{ImageWriter, WriteOutcome};
use crate::placement::domain::placement::{target_path, PlacementStyle};
use crate::shared::constants::FACE_CHIP_SIZE;
use crate::shared::frame::Frame;

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

/// Where an assigned face ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// Routes assigned faces into per-identity folders.
pub struct FacePlacer {
    output_root: PathBuf,
    input_root: PathBuf,
    style: PlacementStyle,
    writer: Box<dyn ImageWriter>,
}

impl FacePlacer {
    /// `input_root` is the tree sources come from; their folders below it
    /// become part of the output name.
    pub fn new(
        output_root: PathBuf,
        input_root: PathBuf,
        style: PlacementStyle,
        writer: Box<dyn ImageWriter>,
    ) -> Self {
        Self {
            output_root,
            input_root,
            style,
            writer,
        }
    }

    pub fn style(&self) -> PlacementStyle {
        self.style
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Persists `face` from `source` under `label`. An existing file with the
    /// same name is left untouched.
    pub fn place(
        &self,
        source: &Path,
        frame: &Frame,
        face: &DetectedFace,
        label: &str,
    ) -> Result<Placement, PlacementError> {
        let path = target_path(
            &self.output_root,
            &self.input_root,
            label,
            source,
            &face.region,
            self.style,
        )
        .ok_or_else(|| PlacementError::NoFileName(source.to_path_buf()))?;

        let written = match self.style {
            PlacementStyle::Copy => self.writer.copy(source, &path),
            PlacementStyle::Crop => {
                let chip = face_chip::extract(frame, &face.region, &face.landmarks, FACE_CHIP_SIZE);
                self.writer.write(&path, &chip, None)
            }
        };

        match written {
            Ok(outcome) => Ok(Placement { path, outcome }),
            Err(e) => Err(PlacementError::Write {
                message: e.to_string(),
                path,
            }),
        }
    }
}
