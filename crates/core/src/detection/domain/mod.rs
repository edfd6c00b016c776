pub mod detected_face;
pub mod embedding_extractor;
pub mod face_chip;
pub mod face_detector;
pub mod face_landmarks;
pub mod landmark_predictor;
