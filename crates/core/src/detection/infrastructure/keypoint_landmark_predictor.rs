use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Uses the keypoints the detector attached to each region.
///
/// Detectors such as the YOLO pose model locate the five landmarks in the
/// same pass as the box. When keypoints are missing or partly invisible the
/// landmarks are estimated from the box proportions.
#[derive(Default)]
pub struct KeypointLandmarkPredictor;

impl KeypointLandmarkPredictor {
    pub fn new() -> Self {
        Self
    }
}

impl LandmarkPredictor for KeypointLandmarkPredictor {
    fn locate(
        &mut self,
        _frame: &Frame,
        region: &Region,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>> {
        let landmarks = region
            .keypoints
            .map(FaceLandmarks::new)
            .filter(FaceLandmarks::all_visible)
            .unwrap_or_else(|| FaceLandmarks::estimate(region));
        Ok(landmarks)
    }
}
