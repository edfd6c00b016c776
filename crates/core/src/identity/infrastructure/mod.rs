pub mod shared_registry;
