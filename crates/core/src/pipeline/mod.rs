pub mod face_analyzer;
pub mod image_report;
pub mod infrastructure;
pub mod load_references_use_case;
pub mod pipeline_executor;
pub mod run_logger;
pub mod sort_config;
pub mod sort_image_use_case;
pub mod sort_photos_use_case;
