pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

/// Extensions accepted at intake, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Euclidean distance below which two faces are the same person.
///
/// Calibrated for unit-scale 128-d descriptors; L2-normalised ArcFace
/// descriptors usually need a larger value (around 1.0-1.1).
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.6;

/// Minimum detector confidence for a face to be considered.
pub const DEFAULT_DETECTION_CONFIDENCE: f64 = 0.5;

/// Label of the folder collecting unmatched faces in supervised mode.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Prefix of identities synthesized in clustering mode (`Person_1`, ...).
pub const CLUSTER_LABEL_PREFIX: &str = "Person_";

/// Side length of saved face chips.
pub const FACE_CHIP_SIZE: u32 = 256;
