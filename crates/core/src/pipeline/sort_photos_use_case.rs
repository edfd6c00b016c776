use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::identity::domain::assignment::SortMode;
use crate::identity::domain::identity_registry::IdentityRegistry;
use crate::identity::infrastructure::shared_registry::SharedRegistry;
use crate::intake::domain::seen_set::SeenSet;
use crate::intake::infrastructure::file_fingerprinter::fingerprint_file;
use crate::intake::infrastructure::image_enumerator::enumerate;
use crate::intake::infrastructure::image_file_reader::ImageFileReader;
use crate::pipeline::face_analyzer::FaceAnalyzer;
use crate::pipeline::image_report::RunSummary;
use crate::pipeline::load_references_use_case::LoadReferencesUseCase;
use crate::pipeline::pipeline_executor::SortExecutor;
use crate::pipeline::run_logger::RunLogger;
use crate::pipeline::sort_config::{RunPaths, SortConfig};
use crate::pipeline::sort_image_use_case::SortImageUseCase;
use crate::placement::domain::face_placer::FacePlacer;
use crate::placement::infrastructure::image_file_writer::ImageFileWriter;

#[derive(Debug, thiserror::Error)]
pub enum SortRunError {
    #[error("no analyzers were supplied")]
    NoAnalyzers,
    #[error("no usable reference images in {}", .0.display())]
    NoReferences(PathBuf),
}

/// Orchestrates a whole sorting run.
///
/// Seeds the registry from references, prepares the seen-set, enumerates
/// the input tree and hands the batch to a `SortExecutor`. One analyzer per
/// worker must be built by the caller before the run, so model-load
/// failures surface before any image is touched.
pub struct SortPhotosUseCase {
    config: SortConfig,
    paths: RunPaths,
    executor: Box<dyn SortExecutor>,
}

impl SortPhotosUseCase {
    pub fn new(config: SortConfig, paths: RunPaths, executor: Box<dyn SortExecutor>) -> Self {
        Self {
            config,
            paths,
            executor,
        }
    }

    pub fn execute(
        &self,
        mut analyzers: Vec<FaceAnalyzer>,
        logger: &mut dyn RunLogger,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let first = analyzers.first_mut().ok_or(SortRunError::NoAnalyzers)?;

        let mut registry = IdentityRegistry::new();
        if let Some(reference) = &self.paths.reference {
            let report = LoadReferencesUseCase::new(Box::new(ImageFileReader::new())).execute(
                first,
                reference,
                &self.paths.output,
                &mut registry,
            )?;
            logger.info(&format!(
                "Loaded {} reference image(s) for {} identities ({} skipped)",
                report.loaded,
                registry.len(),
                report.skipped
            ));
            if self.config.mode == SortMode::Supervised && registry.is_empty() {
                return Err(SortRunError::NoReferences(reference.clone()).into());
            }
        }

        let registry = Arc::new(SharedRegistry::new(
            registry,
            self.config.policy(),
            self.paths.output.clone(),
        ));
        let seen = self.seen_set(logger);

        let images: Vec<PathBuf> = enumerate(&self.paths.input).collect();
        logger.info(&format!(
            "Sorting {} image(s) with {} worker(s), {} mode",
            images.len(),
            analyzers.len(),
            self.config.mode
        ));

        let workers = analyzers
            .into_iter()
            .map(|analyzer| {
                SortImageUseCase::new(
                    analyzer,
                    Box::new(ImageFileReader::new()),
                    Arc::clone(&registry),
                    FacePlacer::new(
                        self.paths.output.clone(),
                        self.paths.input.clone(),
                        self.config.placement,
                        Box::new(ImageFileWriter::new()),
                    ),
                    seen.clone(),
                )
            })
            .collect();

        let mut summary = self.executor.execute(images, workers, logger)?;
        summary.identities = registry.labels()?;
        logger.summary(&summary);
        Ok(summary)
    }

    fn seen_set(&self, logger: &mut dyn RunLogger) -> Option<Arc<SeenSet>> {
        if !self.config.dedup && !self.config.resume {
            return None;
        }
        let seen = SeenSet::new();
        if self.config.resume {
            seed_from_tree(&seen, &self.paths.output);
            logger.info(&format!("Resuming: {} file(s) already sorted", seen.len()));
        }
        Some(Arc::new(seen))
    }
}

/// Marks the bytes of every image under `root` as seen.
fn seed_from_tree(seen: &SeenSet, root: &Path) {
    for path in enumerate(root) {
        match fingerprint_file(&path) {
            Ok(fingerprint) => {
                seen.insert(fingerprint);
            }
            Err(e) => log::warn!("Cannot fingerprint {}: {e}", path.display()),
        }
    }
}
