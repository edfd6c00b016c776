use std::path::PathBuf;

use crate::pipeline::image_report::{ImageReport, RunSummary};
use crate::pipeline::pipeline_executor::SortExecutor;
use crate::pipeline::run_logger::RunLogger;
use crate::pipeline::sort_image_use_case::SortImageUseCase;

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Sorts images on a pool of OS threads, one per worker.
///
/// Layout: `feeder → [worker × N] → main [aggregate/log]`
///
/// Paths and reports travel over bounded channels, so the feeder never runs
/// far ahead of the workers.
pub struct ThreadedSortExecutor {
    channel_capacity: usize,
}

impl ThreadedSortExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedSortExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SortExecutor for ThreadedSortExecutor {
    fn execute(
        &self,
        images: Vec<PathBuf>,
        workers: Vec<SortImageUseCase>,
        logger: &mut dyn RunLogger,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        if workers.is_empty() {
            return Err("At least one worker is required".into());
        }
        let total = images.len();
        let cap = self.channel_capacity.max(workers.len());

        let (path_tx, path_rx) = crossbeam_channel::bounded::<PathBuf>(cap);
        let (report_tx, report_rx) = crossbeam_channel::bounded::<ImageReport>(cap);

        let mut summary = RunSummary::default();
        let mut panicked = 0usize;

        std::thread::scope(|scope| {
            let feeder = scope.spawn(move || {
                for path in images {
                    if path_tx.send(path).is_err() {
                        break;
                    }
                }
            });

            let handles: Vec<_> = workers
                .into_iter()
                .map(|worker| spawn_worker(scope, worker, path_rx.clone(), report_tx.clone()))
                .collect();
            drop(path_rx);
            drop(report_tx);

            for (done, report) in report_rx.iter().enumerate() {
                summary.record(&report);
                logger.image(&report);
                logger.progress(done + 1, total);
            }

            for handle in handles {
                if handle.join().is_err() {
                    panicked += 1;
                }
            }
            if feeder.join().is_err() {
                panicked += 1;
            }
        });

        if panicked > 0 {
            return Err(format!("{panicked} sorting thread(s) panicked").into());
        }
        Ok(summary)
    }
}

fn spawn_worker<'scope>(
    scope: &'scope std::thread::Scope<'scope, '_>,
    mut worker: SortImageUseCase,
    path_rx: crossbeam_channel::Receiver<PathBuf>,
    report_tx: crossbeam_channel::Sender<ImageReport>,
) -> std::thread::ScopedJoinHandle<'scope, ()> {
    scope.spawn(move || {
        for path in path_rx {
            let report = worker.execute(&path);
            if report_tx.send(report).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use crate::detection::domain::embedding_extractor::EmbeddingExtractor;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::detection::infrastructure::keypoint_landmark_predictor::KeypointLandmarkPredictor;
    use crate::identity::domain::assignment::{AssignmentPolicy, SortMode, UnknownPolicy};
    use crate::identity::domain::identity_registry::IdentityRegistry;
    use crate::identity::infrastructure::shared_registry::SharedRegistry;
    use crate::intake::domain::image_reader::ImageReader;
    use crate::pipeline::face_analyzer::FaceAnalyzer;
    use crate::pipeline::image_report::ImageStatus;
    use crate::pipeline::run_logger::NullRunLogger;
    use crate::placement::domain::image_writer::{ImageWriter, WriteOutcome};
    use crate::placement::domain::face_placer::FacePlacer;
    use crate::placement::domain::placement::PlacementStyle;
    use crate::shared::embedding::Embedding;
    use crate::shared::frame::Frame;
    use crate::shared::region::Region;

    /// Paths named `boom*` panic; `empty*` decode to a frame with no faces.
    struct StubReader;

    impl ImageReader for StubReader {
        fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            let name = path.file_name().unwrap().to_string_lossy();
            if name.starts_with("boom") {
                panic!("reader blew up");
            }
            if name.starts_with("bad") {
                return Err("corrupt".into());
            }
            let value = if name.starts_with("empty") { 0 } else { 1 };
            Ok(Frame::new(vec![value; 10 * 10 * 3], 10, 10, 3))
        }
    }

    struct StubDetector;

    impl FaceDetector for StubDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            if frame.data()[0] == 0 {
                Ok(vec![])
            } else {
                Ok(vec![Region::new(2, 2, 6, 6)])
            }
        }
    }

    struct ConstantExtractor;

    impl EmbeddingExtractor for ConstantExtractor {
        fn describe(
            &mut self,
            _frame: &Frame,
            _landmarks: &FaceLandmarks,
        ) -> Result<Embedding, Box<dyn std::error::Error>> {
            Ok(Embedding::new(vec![0.25, 0.5]))
        }
    }

    struct DiscardWriter;

    impl ImageWriter for DiscardWriter {
        fn write(
            &self,
            _path: &Path,
            _frame: &Frame,
            _size: Option<(u32, u32)>,
        ) -> Result<WriteOutcome, Box<dyn std::error::Error>> {
            Ok(WriteOutcome::Written)
        }

        fn copy(
            &self,
            _source: &Path,
            _path: &Path,
        ) -> Result<WriteOutcome, Box<dyn std::error::Error>> {
            Ok(WriteOutcome::Written)
        }
    }

    fn workers(n: usize, registry: &Arc<SharedRegistry>) -> Vec<SortImageUseCase> {
        (0..n)
            .map(|_| {
                SortImageUseCase::new(
                    FaceAnalyzer::new(
                        Box::new(StubDetector),
                        Box::new(KeypointLandmarkPredictor::new()),
                        Box::new(ConstantExtractor),
                    ),
                    Box::new(StubReader),
                    Arc::clone(registry),
                    FacePlacer::new(
                        PathBuf::from("/out"),
                        PathBuf::from("/in"),
                        PlacementStyle::Copy,
                        Box::new(DiscardWriter),
                    ),
                    None,
                )
            })
            .collect()
    }

    fn registry() -> Arc<SharedRegistry> {
        Arc::new(SharedRegistry::new(
            IdentityRegistry::new(),
            AssignmentPolicy {
                mode: SortMode::Clustering,
                threshold: 0.6,
                unknown: UnknownPolicy::Skip,
            },
            PathBuf::from("/out"),
        ))
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/in").join(n)).collect()
    }

    struct CountingLogger {
        images: usize,
        last_progress: (usize, usize),
    }

    impl RunLogger for CountingLogger {
        fn progress(&mut self, current: usize, total: usize) {
            self.last_progress = (current, total);
        }
        fn image(&mut self, _report: &ImageReport) {
            self.images += 1;
        }
        fn info(&mut self, _message: &str) {}
    }

    #[test]
    fn test_every_image_reported_once() {
        let reg = registry();
        let mut logger = CountingLogger {
            images: 0,
            last_progress: (0, 0),
        };
        let summary = ThreadedSortExecutor::new()
            .execute(
                paths(&["a.jpg", "b.jpg", "empty.jpg", "bad.jpg", "c.jpg"]),
                workers(3, &reg),
                &mut logger,
            )
            .unwrap();

        assert_eq!(summary.images, 5);
        assert_eq!(summary.sorted, 3);
        assert_eq!(summary.no_faces, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(logger.images, 5);
        assert_eq!(logger.last_progress, (5, 5));
    }

    #[test]
    fn test_identical_faces_across_workers_share_one_identity() {
        let reg = registry();
        let names: Vec<String> = (0..40).map(|i| format!("img{i:02}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let summary = ThreadedSortExecutor::new()
            .execute(paths(&refs), workers(4, &reg), &mut NullRunLogger)
            .unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.matched, 39);
        assert_eq!(reg.len().unwrap(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let reg = registry();
        let summary = ThreadedSortExecutor::new()
            .execute(vec![], workers(2, &reg), &mut NullRunLogger)
            .unwrap();
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_no_workers_is_error() {
        let result = ThreadedSortExecutor::new().execute(
            paths(&["a.jpg"]),
            vec![],
            &mut NullRunLogger,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_worker_panic_becomes_error() {
        let reg = registry();
        let result = ThreadedSortExecutor::new().execute(
            paths(&["a.jpg", "boom.jpg", "b.jpg"]),
            workers(1, &reg),
            &mut NullRunLogger,
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("panicked"));
    }

    #[test]
    fn test_sorted_status_carries_faces() {
        let reg = registry();
        let mut seen = Vec::new();
        struct Collect<'a>(&'a mut Vec<ImageStatus>);
        impl RunLogger for Collect<'_> {
            fn progress(&mut self, _current: usize, _total: usize) {}
            fn image(&mut self, report: &ImageReport) {
                self.0.push(report.status.clone());
            }
            fn info(&mut self, _message: &str) {}
        }
        ThreadedSortExecutor::new()
            .execute(paths(&["a.jpg"]), workers(1, &reg), &mut Collect(&mut seen))
            .unwrap();
        match &seen[0] {
            ImageStatus::Sorted { faces } => assert_eq!(faces.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
