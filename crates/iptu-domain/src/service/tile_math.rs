//! Web-mercator tile math
//!
//! Converts detected pixel areas to square meters. Standard web-map tile
//! formula: ground resolution shrinks with latitude and doubles per zoom
//! level.

/// Ground resolution at the equator for zoom 0, in meters per pixel
/// (earth circumference / 256-pixel tile).
const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.03392;

/// Default zoom level for property imagery (~0.3 m/pixel at the equator)
pub const DEFAULT_ZOOM: u32 = 19;

/// Default fetched image edge length in pixels
pub const DEFAULT_IMAGE_SIZE: u32 = 640;

/// Ground resolution in meters per pixel at the given latitude and zoom
pub fn meters_per_pixel(latitude: f64, zoom: u32) -> f64 {
    EQUATOR_METERS_PER_PIXEL * latitude.to_radians().cos() / 2f64.powi(zoom as i32)
}

/// Convert a pixel area to square meters at the given latitude and zoom
pub fn pixel_area_to_square_meters(area_pixels: f64, latitude: f64, zoom: u32) -> f64 {
    let mpp = meters_per_pixel(latitude, zoom);
    area_pixels * mpp * mpp
}
