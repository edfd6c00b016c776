/// ArcFace embedding extractor using ONNX Runtime.
///
/// Aligns the face from its landmarks, feeds a 112x112 chip to the model
/// and L2-normalizes the output so Euclidean distances are comparable
/// across faces.
use std::path::Path;

use crate::detection::domain::embedding_extractor::EmbeddingExtractor;
use crate::detection::domain::face_chip;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::infrastructure::onnx_session::open_session;
use crate::shared::embedding::Embedding;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct OnnxArcFaceExtractor {
    session: ort::session::Session,
}

impl OnnxArcFaceExtractor {
    pub fn new(model_path: &Path, workers: usize) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path, workers)?,
        })
    }
}

impl EmbeddingExtractor for OnnxArcFaceExtractor {
    fn describe(
        &mut self,
        frame: &Frame,
        landmarks: &FaceLandmarks,
    ) -> Result<Embedding, Box<dyn std::error::Error>> {
        let (cx, cy) = landmarks.center()?;
        // Only used when the eyes are missing; sized from the landmark spread.
        let fallback = landmark_box(landmarks, cx, cy);
        let chip = face_chip::extract(frame, &fallback, landmarks, INPUT_SIZE as u32);

        let tensor = preprocess(&chip);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let values = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?
            .to_vec();
        Ok(Embedding::normalized(values))
    }
}

fn landmark_box(landmarks: &FaceLandmarks, cx: f64, cy: f64) -> Region {
    let spread = landmarks
        .points()
        .iter()
        .filter(|(x, _)| *x > 0.0)
        .map(|(x, y)| (x - cx).abs().max((y - cy).abs()))
        .fold(0.0f64, f64::max);
    let half = (spread * 2.0).max(8.0);
    Region::new(
        (cx - half) as i32,
        (cy - half) as i32,
        (half * 2.0) as i32,
        (half * 2.0) as i32,
    )
}

/// Normalize a 112x112 chip to [-1, 1], NCHW layout.
fn preprocess(chip: &Frame) -> ndarray::Array4<f32> {
    let src = chip.as_ndarray();
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE.min(chip.height() as usize) {
        for x in 0..INPUT_SIZE.min(chip.width() as usize) {
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[y, x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chip(value: u8) -> Frame {
        Frame::new(vec![value; INPUT_SIZE * INPUT_SIZE * 3], 112, 112, 3)
    }

    #[test]
    fn test_preprocess_shape() {
        assert_eq!(preprocess(&chip(128)).shape(), &[1, 3, 112, 112]);
    }

    #[test]
    fn test_preprocess_normalization_range() {
        assert!((preprocess(&chip(255))[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
        assert!((preprocess(&chip(0))[[0, 2, 5, 5]] + 1.0).abs() < 0.01);
        let mid = preprocess(&chip(127))[[0, 1, 50, 50]];
        assert!((mid - (127.0 - 127.5) / 127.5).abs() < 0.01);
    }

    #[test]
    fn test_landmark_box_covers_points() {
        let lm = FaceLandmarks::new([
            (0.0, 0.0),
            (0.0, 0.0),
            (100.0, 100.0),
            (90.0, 120.0),
            (110.0, 120.0),
        ]);
        let (cx, cy) = lm.center().unwrap();
        let r = landmark_box(&lm, cx, cy);
        assert!(r.x < 90 && r.x + r.width > 110);
        assert!(r.y < 100 && r.y + r.height > 120);
    }
}
