use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::embedding::Embedding;
use crate::shared::frame::Frame;

/// Turns an aligned face into a fixed-length descriptor.
///
/// Two calls on the same face are expected to return nearly identical
/// vectors; the registry relies on that stability for matching.
pub trait EmbeddingExtractor: Send {
    fn describe(
        &mut self,
        frame: &Frame,
        landmarks: &FaceLandmarks,
    ) -> Result<Embedding, Box<dyn std::error::Error>>;
}
