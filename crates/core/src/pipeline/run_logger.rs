use std::time::Instant;

use crate::identity::domain::assignment::AssignmentKind;
use crate::pipeline::image_report::{ImageReport, ImageStatus, RunSummary};

/// Observer for sorting runs.
///
/// Keeps the use cases free of any particular output mechanism.
pub trait RunLogger: Send {
    /// Report image-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Called once per finished image, in completion order.
    fn image(&mut self, report: &ImageReport);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self, _summary: &RunSummary) {}
}

/// Silent logger for tests.
pub struct NullRunLogger;

impl RunLogger for NullRunLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn image(&mut self, _report: &ImageReport) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger that writes through the `log` facade.
///
/// Progress output is throttled to every `throttle_images` images.
pub struct LogRunLogger {
    throttle_images: usize,
    start_time: Instant,
}

impl LogRunLogger {
    pub fn new(throttle_images: usize) -> Self {
        Self {
            throttle_images: throttle_images.max(1),
            start_time: Instant::now(),
        }
    }

    pub fn summary_string(&self, summary: &RunSummary) -> String {
        let secs = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![
            format!("Run summary ({} images, {secs:.1}s total):", summary.images),
            format!(
                "  sorted {}, no faces {}, duplicates {}, failed {}",
                summary.sorted, summary.no_faces, summary.duplicates, summary.failed
            ),
            format!(
                "  faces {}: matched {}, new {}, unmatched {}",
                summary.faces, summary.matched, summary.created, summary.unmatched
            ),
            format!("  files written: {}", summary.written),
        ];
        if summary.identities.is_empty() {
            lines.push("  identities: none".to_string());
        } else {
            lines.push(format!(
                "  identities ({}): {}",
                summary.identities.len(),
                summary.identities.join(", ")
            ));
        }
        if summary.images > 0 && secs > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} images/s",
                summary.images as f64 / secs
            ));
        }
        lines.join("\n")
    }
}

impl Default for LogRunLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

fn file_name(report: &ImageReport) -> std::borrow::Cow<'_, str> {
    report
        .path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| report.path.to_string_lossy())
}

impl RunLogger for LogRunLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if total > 0 && (current % self.throttle_images == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} images ({pct:.1}%)");
        }
    }

    fn image(&mut self, report: &ImageReport) {
        let name = file_name(report);
        match &report.status {
            ImageStatus::Sorted { faces } => {
                for face in faces {
                    let distance = face
                        .outcome
                        .distance
                        .map(|d| format!("{d:.3}"))
                        .unwrap_or_else(|| "-".to_string());
                    match (&face.outcome.label, face.outcome.kind) {
                        (Some(label), AssignmentKind::CreatedNew) => {
                            log::info!("Face found in {name}: new identity {label} (nearest {distance})")
                        }
                        (Some(label), _) => {
                            log::info!("Face found in {name}: {label} (distance {distance})")
                        }
                        (None, _) => {
                            log::info!("Face found in {name}: no match (nearest {distance})")
                        }
                    }
                }
            }
            ImageStatus::NoFaces => log::info!("No face detected in {name}"),
            ImageStatus::Duplicate => log::debug!("Skipping duplicate {}", report.path.display()),
            ImageStatus::Failed(message) => {
                log::warn!("Skipping {}: {message}", report.path.display())
            }
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self, summary: &RunSummary) {
        log::info!("\n\n{}", self.summary_string(summary));
    }
}
