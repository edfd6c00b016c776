use std::path::{Component, Path};

use crate::identity::domain::identity_registry::{IdentityRegistry, RegistryError};
use crate::intake::domain::image_reader::ImageReader;
use crate::intake::infrastructure::image_enumerator::enumerate;
use crate::pipeline::face_analyzer::FaceAnalyzer;
use crate::placement::domain::placement::{folder_name, identity_folder};
use crate::shared::constants::UNKNOWN_LABEL;

/// Counts from loading a reference directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Label for a reference image: the file stem for images directly under
/// `root`, otherwise the name of the top-level folder holding it.
pub fn reference_label(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();
    let first = match components.next()? {
        Component::Normal(name) => name,
        _ => return None,
    };
    if components.next().is_none() {
        relative.file_stem().map(|s| s.to_string_lossy().into_owned())
    } else {
        Some(first.to_string_lossy().into_owned())
    }
}

/// Seeds a registry from a directory of labelled reference photos.
///
/// Each usable reference must show exactly one face. Photos that cannot be
/// read or show zero or several faces are logged and skipped, as are labels
/// whose folder would be the `Unknown` bucket or another identity's folder.
pub struct LoadReferencesUseCase {
    reader: Box<dyn ImageReader>,
}

impl LoadReferencesUseCase {
    pub fn new(reader: Box<dyn ImageReader>) -> Self {
        Self { reader }
    }

    pub fn execute(
        &self,
        analyzer: &mut FaceAnalyzer,
        reference_root: &Path,
        output_root: &Path,
        registry: &mut IdentityRegistry,
    ) -> Result<ReferenceReport, RegistryError> {
        let mut report = ReferenceReport::default();

        for path in enumerate(reference_root) {
            let Some(label) = reference_label(reference_root, &path) else {
                report.skipped += 1;
                continue;
            };
            if folder_name(&label).eq_ignore_ascii_case(UNKNOWN_LABEL) {
                log::warn!(
                    "Skipping reference {}: '{label}' is reserved for unmatched faces",
                    path.display()
                );
                report.skipped += 1;
                continue;
            }
            let frame = match self.reader.read(&path) {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Skipping reference {}: {e}", path.display());
                    report.skipped += 1;
                    continue;
                }
            };
            let mut faces = match analyzer.analyze(&frame) {
                Ok(faces) => faces,
                Err(e) => {
                    log::warn!("Skipping reference {}: {e}", path.display());
                    report.skipped += 1;
                    continue;
                }
            };
            if faces.len() != 1 {
                log::warn!(
                    "Skipping reference {}: expected exactly one face, found {}",
                    path.display(),
                    faces.len()
                );
                report.skipped += 1;
                continue;
            }
            let embedding = faces.remove(0).embedding;

            if registry.find(&label).is_some() {
                registry.add_reference(&label, embedding)?;
            } else {
                match registry.insert(&label, embedding, identity_folder(output_root, &label)) {
                    Ok(_) => log::debug!("Reference identity {label}"),
                    Err(e @ RegistryError::FolderTaken { .. }) => {
                        log::warn!("Skipping reference {}: {e}", path.display());
                        report.skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
            report.loaded += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::detection::domain::embedding_extractor::EmbeddingExtractor;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::detection::infrastructure::keypoint_landmark_predictor::KeypointLandmarkPredictor;
    use crate::shared::embedding::Embedding;
    use crate::shared::frame::Frame;
    use crate::shared::region::Region;

    /// First byte is the number of faces, second the embedding value. The
    /// count is stored in the first pixel's green channel so a zero-face
    /// file still decodes to a valid frame.
    struct StubReader;

    impl ImageReader for StubReader {
        fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            let bytes = std::fs::read(path)?;
            if bytes.len() < 2 {
                return Err("truncated".into());
            }
            let width = 10 * u32::from(bytes[0]).max(1);
            let mut data = vec![0u8; (width * 10 * 3) as usize];
            data[0] = bytes[1];
            data[1] = bytes[0];
            Ok(Frame::new(data, width, 10, 3))
        }
    }

    /// One 10px face per count stored by `StubReader`.
    struct StubDetector;

    impl FaceDetector for StubDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            let n = i32::from(frame.data()[1]);
            Ok((0..n).map(|i| Region::new(i * 10, 0, 10, 10)).collect())
        }
    }

    struct StubExtractor {
        value: f32,
    }

    impl EmbeddingExtractor for StubExtractor {
        fn describe(
            &mut self,
            _frame: &Frame,
            _landmarks: &FaceLandmarks,
        ) -> Result<Embedding, Box<dyn std::error::Error>> {
            Ok(Embedding::new(vec![self.value, 0.0]))
        }
    }

    fn analyzer() -> FaceAnalyzer {
        FaceAnalyzer::new(
            Box::new(StubDetector),
            Box::new(KeypointLandmarkPredictor::new()),
            Box::new(StubExtractor { value: 0.5 }),
        )
    }

    fn write(path: &Path, faces: u8) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, [faces, 7]).unwrap();
    }

    #[test]
    fn test_reference_label_from_stem_or_folder() {
        let root = Path::new("/refs");
        assert_eq!(
            reference_label(root, Path::new("/refs/alice.jpg")),
            Some("alice".to_string())
        );
        assert_eq!(
            reference_label(root, Path::new("/refs/bob/beach.png")),
            Some("bob".to_string())
        );
        assert_eq!(
            reference_label(root, Path::new("/refs/bob/2019/x.png")),
            Some("bob".to_string())
        );
        assert_eq!(reference_label(root, Path::new("/other/a.jpg")), None);
    }

    #[test]
    fn test_loads_single_face_references() {
        let dir = tempfile::tempdir().unwrap();
        let refs = dir.path().join("refs");
        write(&refs.join("alice.jpg"), 1);
        write(&refs.join("bob").join("one.jpg"), 1);
        write(&refs.join("bob").join("two.jpg"), 1);

        let mut registry = IdentityRegistry::new();
        let report = LoadReferencesUseCase::new(Box::new(StubReader))
            .execute(&mut analyzer(), &refs, Path::new("/out"), &mut registry)
            .unwrap();

        assert_eq!(report, ReferenceReport { loaded: 3, skipped: 0 });
        assert_eq!(registry.labels(), vec!["alice", "bob"]);
        let bob = registry.find("bob").unwrap();
        assert_eq!(bob.references().len(), 2);
        assert_eq!(bob.folder(), &PathBuf::from("/out/bob"));
    }

    #[test]
    fn test_skips_group_photos_empty_and_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let refs = dir.path().join("refs");
        write(&refs.join("alice.jpg"), 1);
        write(&refs.join("team.jpg"), 3);
        write(&refs.join("landscape.jpg"), 0);
        std::fs::write(refs.join("broken.jpg"), [1u8]).unwrap();

        let mut registry = IdentityRegistry::new();
        let report = LoadReferencesUseCase::new(Box::new(StubReader))
            .execute(&mut analyzer(), &refs, Path::new("/out"), &mut registry)
            .unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(registry.labels(), vec!["alice"]);
    }

    #[test]
    fn test_unknown_label_is_reserved() {
        let dir = tempfile::tempdir().unwrap();
        let refs = dir.path().join("refs");
        write(&refs.join("Unknown.jpg"), 1);
        write(&refs.join("unknown").join("a.jpg"), 1);
        write(&refs.join("alice.jpg"), 1);

        let mut registry = IdentityRegistry::new();
        let report = LoadReferencesUseCase::new(Box::new(StubReader))
            .execute(&mut analyzer(), &refs, Path::new("/out"), &mut registry)
            .unwrap();

        assert_eq!(report, ReferenceReport { loaded: 1, skipped: 2 });
        assert_eq!(registry.labels(), vec!["alice"]);
    }

    #[test]
    fn test_labels_sharing_a_folder_keep_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let refs = dir.path().join("refs");
        write(&refs.join("a_b.jpg"), 1);
        write(&refs.join("a:b").join("x.jpg"), 1);

        let mut registry = IdentityRegistry::new();
        let report = LoadReferencesUseCase::new(Box::new(StubReader))
            .execute(&mut analyzer(), &refs, Path::new("/out"), &mut registry)
            .unwrap();

        assert_eq!(report, ReferenceReport { loaded: 1, skipped: 1 });
        assert_eq!(registry.labels().len(), 1);
    }

    #[test]
    fn test_empty_reference_dir_leaves_registry_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = IdentityRegistry::new();
        let report = LoadReferencesUseCase::new(Box::new(StubReader))
            .execute(&mut analyzer(), dir.path(), Path::new("/out"), &mut registry)
            .unwrap();
        assert_eq!(report, ReferenceReport::default());
        assert!(registry.is_empty());
    }
}
