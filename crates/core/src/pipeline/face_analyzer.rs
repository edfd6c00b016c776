use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::embedding_extractor::EmbeddingExtractor;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::shared::frame::Frame;

/// One worker's set of vision models: detect, locate landmarks, describe.
pub struct FaceAnalyzer {
    detector: Box<dyn FaceDetector>,
    landmarks: Box<dyn LandmarkPredictor>,
    extractor: Box<dyn EmbeddingExtractor>,
}

impl FaceAnalyzer {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        landmarks: Box<dyn LandmarkPredictor>,
        extractor: Box<dyn EmbeddingExtractor>,
    ) -> Self {
        Self {
            detector,
            landmarks,
            extractor,
        }
    }

    /// Every face in `frame` with its embedding, in detector order.
    pub fn analyze(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        let regions = self.detector.detect(frame)?;
        let mut faces = Vec::with_capacity(regions.len());
        for region in regions {
            let landmarks = self.landmarks.locate(frame, &region)?;
            let embedding = self.extractor.describe(frame, &landmarks)?;
            faces.push(DetectedFace {
                region,
                landmarks,
                embedding,
            });
        }
        Ok(faces)
    }
}
