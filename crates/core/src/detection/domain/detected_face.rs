use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::embedding::Embedding;
use crate::shared::region::Region;

/// A face found in one image, ready for identity assignment.
#[derive(Clone, Debug)]
pub struct DetectedFace {
    pub region: Region,
    pub landmarks: FaceLandmarks,
    pub embedding: Embedding,
}
