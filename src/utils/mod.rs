//! Utility modules: build info and persistence.

pub mod build_info;
pub mod persistence;

pub use persistence::{load_world, save_world, world_fingerprint, PersistenceError};
