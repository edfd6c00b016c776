use std::path::Path;

use image::{DynamicImage, ImageDecoder};

use crate::intake::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Decodes JPEG and PNG files with the `image` crate, honouring EXIF
/// orientation so face boxes line up with what a viewer shows.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut decoder = image::ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let orientation = decoder.orientation()?;
        let mut img = DynamicImage::from_decoder(decoder)?;
        img.apply_orientation(orientation);
        Ok(Frame::from_rgb(img.to_rgb8()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_png_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        image::RgbaImage::from_pixel(6, 4, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!((frame.width(), frame.height(), frame.channels()), (6, 4, 3));
        assert_eq!(frame.pixel(5, 3).unwrap(), &[10, 20, 30]);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(ImageFileReader::new().read(&path).is_err());
    }
}
