use std::path::Path;

use crate::shared::frame::Frame;

/// Decodes a candidate image into RGB pixels.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
