pub mod fingerprint;
pub mod image_reader;
pub mod seen_set;
