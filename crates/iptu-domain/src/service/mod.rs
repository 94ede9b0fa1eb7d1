//! Domain services

pub mod classifier;
pub mod tile_math;
