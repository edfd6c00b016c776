use std::path::Path;

use crate::shared::frame::Frame;

/// Result of an idempotent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// A file with that name already existed; nothing was touched.
    AlreadyPresent,
}

/// Persists sorted output. Both operations create missing parent folders
/// and never overwrite an existing file.
pub trait ImageWriter: Send {
    /// Encodes `frame` to `path`, optionally resizing to the given dimensions.
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<WriteOutcome, Box<dyn std::error::Error>>;

    /// Copies `source` byte for byte to `path`.
    fn copy(&self, source: &Path, path: &Path) -> Result<WriteOutcome, Box<dyn std::error::Error>>;
}
