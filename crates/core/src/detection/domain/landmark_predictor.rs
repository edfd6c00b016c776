use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Locates the alignment points of a detected face.
pub trait LandmarkPredictor: Send {
    fn locate(
        &mut self,
        frame: &Frame,
        region: &Region,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>>;
}
