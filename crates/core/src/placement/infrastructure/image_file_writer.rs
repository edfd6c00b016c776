use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::placement::domain::image_writer::{ImageWriter, WriteOutcome};
use crate::shared::frame::Frame;

/// Writes sorted output with the `image` crate.
///
/// Every file is staged in a temp file beside its target and moved into
/// place without clobbering, so concurrent workers writing the same name
/// end up with exactly one complete file.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn staging_file(path: &Path) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
    let parent = path
        .parent()
        .ok_or_else(|| format!("{} has no parent directory", path.display()))?;
    std::fs::create_dir_all(parent)?;
    Ok(NamedTempFile::new_in(parent)?)
}

fn commit(staged: NamedTempFile, path: &Path) -> Result<WriteOutcome, Box<dyn std::error::Error>> {
    match staged.persist_noclobber(path) {
        Ok(_) => Ok(WriteOutcome::Written),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            Ok(WriteOutcome::AlreadyPresent)
        }
        Err(e) => Err(Box::new(e.error)),
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<WriteOutcome, Box<dyn std::error::Error>> {
        if path.exists() {
            return Ok(WriteOutcome::AlreadyPresent);
        }
        let format = image::ImageFormat::from_path(path)?;

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;
        let img = if let Some((w, h)) = size {
            image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle)
        } else {
            img
        };

        let mut staged = staging_file(path)?;
        {
            let mut out = BufWriter::new(staged.as_file_mut());
            img.write_to(&mut out, format)?;
            out.flush()?;
        }
        commit(staged, path)
    }

    fn copy(&self, source: &Path, path: &Path) -> Result<WriteOutcome, Box<dyn std::error::Error>> {
        if path.exists() {
            return Ok(WriteOutcome::AlreadyPresent);
        }
        let mut staged = staging_file(path)?;
        std::io::copy(&mut File::open(source)?, staged.as_file_mut())?;
        staged.as_file_mut().flush()?;
        commit(staged, path)
    }
}
