use std::path::PathBuf;

use crate::identity::domain::assignment::{AssignmentKind, AssignmentOutcome};
use crate::placement::domain::face_placer::Placement;
use crate::placement::domain::image_writer::WriteOutcome;
use crate::shared::region::Region;

/// What happened to one detected face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceReport {
    pub region: Region,
    pub outcome: AssignmentOutcome,
    /// `None` when the face was discarded.
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageStatus {
    Sorted { faces: Vec<FaceReport> },
    NoFaces,
    /// Same bytes as an image already handled.
    Duplicate,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub path: PathBuf,
    pub status: ImageStatus,
}

impl ImageReport {
    pub fn new(path: PathBuf, status: ImageStatus) -> Self {
        Self { path, status }
    }

    pub fn failed(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(path, ImageStatus::Failed(message.into()))
    }
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub images: usize,
    pub sorted: usize,
    pub no_faces: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub faces: usize,
    pub matched: usize,
    pub created: usize,
    pub unmatched: usize,
    /// Files newly written to the output tree.
    pub written: usize,
    /// Labels in the registry at the end of the run, in creation order.
    pub identities: Vec<String>,
}

impl RunSummary {
    pub fn record(&mut self, report: &ImageReport) {
        self.images += 1;
        match &report.status {
            ImageStatus::Sorted { faces } => {
                self.sorted += 1;
                for face in faces {
                    self.faces += 1;
                    match face.outcome.kind {
                        AssignmentKind::MatchedExisting => self.matched += 1,
                        AssignmentKind::CreatedNew => self.created += 1,
                        AssignmentKind::Unmatched => self.unmatched += 1,
                    }
                    if face
                        .placement
                        .as_ref()
                        .is_some_and(|p| p.outcome == WriteOutcome::Written)
                    {
                        self.written += 1;
                    }
                }
            }
            ImageStatus::NoFaces => self.no_faces += 1,
            ImageStatus::Duplicate => self.duplicates += 1,
            ImageStatus::Failed(_) => self.failed += 1,
        }
    }
}
