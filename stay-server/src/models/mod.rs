//! Request/response models

pub mod admission;
pub mod prediction;

pub use admission::*;
pub use prediction::*;
