use std::path::PathBuf;

use crate::pipeline::image_report::RunSummary;
use crate::pipeline::run_logger::RunLogger;
use crate::pipeline::sort_image_use_case::SortImageUseCase;

/// Abstracts how a batch of images is spread over sorting workers.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations.
pub trait SortExecutor: Send {
    /// Runs every image through one of `workers` and aggregates the results.
    ///
    /// Per-image failures are part of the summary; an `Err` means the run
    /// itself broke (e.g. a worker thread panicked).
    fn execute(
        &self,
        images: Vec<PathBuf>,
        workers: Vec<SortImageUseCase>,
        logger: &mut dyn RunLogger,
    ) -> Result<RunSummary, Box<dyn std::error::Error>>;
}
