pub mod keypoint_landmark_predictor;
pub mod onnx_arcface_extractor;
pub mod onnx_session;
pub mod onnx_yolo_detector;
