//! Domain layer for iptu-checker
//!
//! Pure logic only: area comparison, status classification, web-mercator
//! tile math, and the repository seam. No IO, no HTTP.

pub mod model;
pub mod repository;
pub mod service;

pub use model::{sample_properties, Property};
pub use service::classifier::{classify, compare_areas, AreaComparison, DEFAULT_TOLERANCE_PERCENT};
pub use service::tile_math::{
    meters_per_pixel, pixel_area_to_square_meters, DEFAULT_IMAGE_SIZE, DEFAULT_ZOOM,
};
