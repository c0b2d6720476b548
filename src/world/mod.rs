//! World snapshot data model.

pub mod initial;
pub mod types;

pub use types::*;
