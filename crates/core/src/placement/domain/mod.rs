pub mod face_placer;
pub mod image_writer;
pub mod placement;
