pub mod assignment;
pub mod identity;
pub mod identity_registry;
