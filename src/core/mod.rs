// src/core/mod.rs

pub mod encoder;
pub mod engine;
pub mod format;
pub mod interval;
pub mod model;
pub mod types;
