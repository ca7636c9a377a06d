//! Monitors the Chicago City Clerk eLMS for newly published
//! zoning-reclassification ordinances, geocodes the referenced addresses,
//! joins them against community-area and ward boundaries, and reports zoning
//! activity near an area of interest.
//!
//! The pipeline is a strictly sequential batch: fetch, extract, geocode,
//! spatial-join, filter, export. It runs to completion once per invocation.

pub mod address;
pub mod boundaries;
pub mod config;
pub mod email;
pub mod error;
pub mod export;
pub mod fetch;
pub mod geocode;
pub mod join;
pub mod pipeline;
pub mod store;
pub mod types;

pub use address::AddressExtractor;
pub use boundaries::{AreaOfInterestBuffer, BoundaryLayer, BoundaryPolygon};
pub use config::{Config, ConfigBuilder, Settings};
pub use error::{Error, Result};
pub use store::Store;
pub use types::{GeocodeResult, OrdinanceRecord, ZoningRequest};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, ConfigBuilder, Settings};
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{run, RunSummary};
    pub use crate::types::{GeocodeResult, OrdinanceRecord, ZoningRequest};
}
