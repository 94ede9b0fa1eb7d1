//! Domain models

mod property;

pub use property::{sample_properties, Property};
