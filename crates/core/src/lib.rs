//! Sorts photographs into per-person folders by facial similarity.
//!
//! Bounded contexts follow a `domain` / `infrastructure` split: domain
//! modules hold pure types and traits, infrastructure modules the
//! filesystem- and model-backed implementations.

pub mod detection;
pub mod identity;
pub mod intake;
pub mod pipeline;
pub mod placement;
pub mod shared;
