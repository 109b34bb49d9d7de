//! Logic Module - Business Logic & Engines
//!
//! - `features/` - bucketing, training schema, alignment
//! - `model/` - bundle, inference backends, label decoding
//! - `pipeline` - bucket → align → predict → decode

pub mod config;
pub mod features;
pub mod model;
pub mod pipeline;
