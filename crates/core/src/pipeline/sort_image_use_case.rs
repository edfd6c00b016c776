use std::path::Path;
use std::sync::Arc;

use crate::identity::infrastructure::shared_registry::SharedRegistry;
use crate::intake::domain::image_reader::ImageReader;
use crate::intake::domain::seen_set::SeenSet;
use crate::intake::infrastructure::file_fingerprinter::fingerprint_file;
use crate::pipeline::face_analyzer::FaceAnalyzer;
use crate::pipeline::image_report::{FaceReport, ImageReport, ImageStatus};
use crate::placement::domain::face_placer::FacePlacer;

/// Sorts a single candidate image: dedup → decode → analyze → assign →
/// place, once per detected face.
///
/// Owns one worker's models; the registry and seen-set are shared.
pub struct SortImageUseCase {
    analyzer: FaceAnalyzer,
    reader: Box<dyn ImageReader>,
    registry: Arc<SharedRegistry>,
    placer: FacePlacer,
    seen: Option<Arc<SeenSet>>,
}

impl SortImageUseCase {
    pub fn new(
        analyzer: FaceAnalyzer,
        reader: Box<dyn ImageReader>,
        registry: Arc<SharedRegistry>,
        placer: FacePlacer,
        seen: Option<Arc<SeenSet>>,
    ) -> Self {
        Self {
            analyzer,
            reader,
            registry,
            placer,
            seen,
        }
    }

    /// Never fails: every problem is reported in the returned status so one
    /// bad file cannot stop a batch.
    pub fn execute(&mut self, path: &Path) -> ImageReport {
        let owned = path.to_path_buf();

        if let Some(seen) = &self.seen {
            match fingerprint_file(path) {
                Ok(fingerprint) => {
                    if !seen.insert(fingerprint) {
                        return ImageReport::new(owned, ImageStatus::Duplicate);
                    }
                }
                Err(e) => return ImageReport::failed(owned, e.to_string()),
            }
        }

        let frame = match self.reader.read(path) {
            Ok(frame) => frame,
            Err(e) => return ImageReport::failed(owned, format!("decode failed: {e}")),
        };
        let faces = match self.analyzer.analyze(&frame) {
            Ok(faces) => faces,
            Err(e) => return ImageReport::failed(owned, format!("detection failed: {e}")),
        };
        if faces.is_empty() {
            return ImageReport::new(owned, ImageStatus::NoFaces);
        }

        let mut reports = Vec::with_capacity(faces.len());
        for face in faces {
            let outcome = match self.registry.assign(&face.embedding) {
                Ok(outcome) => outcome,
                Err(e) => return ImageReport::failed(owned, e.to_string()),
            };
            let placement = match &outcome.label {
                Some(label) => match self.placer.place(path, &frame, &face, label) {
                    Ok(placement) => Some(placement),
                    Err(e) => return ImageReport::failed(owned, e.to_string()),
                },
                None => None,
            };
            reports.push(FaceReport {
                region: face.region,
                outcome,
                placement,
            });
        }

        ImageReport::new(owned, ImageStatus::Sorted { faces: reports })
    }
}
