#![allow(dead_code)]

use std::path::{Path, PathBuf};

use facesort_core::detection::domain::embedding_extractor::EmbeddingExtractor;
use facesort_core::detection::domain::face_detector::FaceDetector;
use facesort_core::detection::domain::face_landmarks::FaceLandmarks;
use facesort_core::detection::infrastructure::keypoint_landmark_predictor::KeypointLandmarkPredictor;
use facesort_core::pipeline::face_analyzer::FaceAnalyzer;
use facesort_core::shared::embedding::Embedding;
use facesort_core::shared::frame::Frame;
use facesort_core::shared::region::Region;

/// Sees one face in the middle of every non-black image, and one face per
/// half in images at least twice as wide as tall.
pub struct StubDetector;

impl FaceDetector for StubDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if frame.data().iter().all(|&v| v < 8) {
            return Ok(vec![]);
        }
        let (w, h) = (frame.width() as i32, frame.height() as i32);
        if w >= 2 * h {
            let half = w / 2;
            Ok(vec![
                Region::new(half / 4, h / 4, half / 2, h / 2),
                Region::new(half + half / 4, h / 4, half / 2, h / 2),
            ])
        } else {
            Ok(vec![Region::new(w / 4, h / 4, w / 2, h / 2)])
        }
    }
}

/// A face's embedding is the colour under its landmark center.
pub struct ColorExtractor;

impl EmbeddingExtractor for ColorExtractor {
    fn describe(
        &mut self,
        frame: &Frame,
        landmarks: &FaceLandmarks,
    ) -> Result<Embedding, Box<dyn std::error::Error>> {
        let (x, y) = landmarks.center()?;
        let px = frame
            .pixel(x.round() as i64, y.round() as i64)
            .ok_or("landmark center outside frame")?;
        Ok(Embedding::new(
            px.iter().map(|&v| f32::from(v) / 255.0).collect(),
        ))
    }
}

pub fn analyzers(n: usize) -> Vec<FaceAnalyzer> {
    (0..n)
        .map(|_| {
            FaceAnalyzer::new(
                Box::new(StubDetector),
                Box::new(KeypointLandmarkPredictor::new()),
                Box::new(ColorExtractor),
            )
        })
        .collect()
}

pub const RED: [u8; 3] = [220, 20, 20];
pub const GREEN: [u8; 3] = [20, 200, 20];
pub const BLUE: [u8; 3] = [20, 20, 220];

/// A single-colour "portrait". `size` varies the bytes without changing
/// the person.
pub fn portrait(path: &Path, rgb: [u8; 3], size: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_pixel(size, size, image::Rgb(rgb))
        .save(path)
        .unwrap();
}

/// Two people side by side.
pub fn group_photo(path: &Path, left: [u8; 3], right: [u8; 3]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(128, 48, |x, _| {
        if x < 64 {
            image::Rgb(left)
        } else {
            image::Rgb(right)
        }
    });
    img.save(path).unwrap();
}

/// Every file under `root`, relative and sorted.
pub fn tree(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walk(root)
        .into_iter()
        .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return vec![];
    };
    let mut out = Vec::new();
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            out.extend(walk(&path));
        } else {
            out.push(path);
        }
    }
    out
}
