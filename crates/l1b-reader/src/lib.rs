//! MetOp Level-1B reader.
//!
//! Opens EPS native Level-1B products (AMSU-A, MHS) and exposes their
//! per-scan-line, per-FOV measurements as typed, physically-scaled 2-D
//! rasters with windowed sub-raster extraction.
//!
//! # Architecture
//!
//! A reader instance owns everything for one open product and nothing
//! survives a close:
//!
//! - the variable registry, loaded per sensor from a packaged schema
//! - the decode cache, turning MDR payloads into memoized f64 rasters
//! - windowed extraction, cutting fixed-size sample windows with fill
//!   sentinels at swath boundaries
//! - time locators for per-line acquisition times
//!
//! Swath geometry construction, the matchup join and NetCDF output are
//! external consumers of the raster, window and CF-attribute contracts.

pub mod attributes;
pub mod cache;
pub mod error;
pub mod raster;
pub mod reader;
pub mod registry;
pub mod testdata;
pub mod time;
pub mod window;

// Re-exports
pub use attributes::{cf_attributes, AttributeValue, CfAttribute};
pub use cache::VariableCache;
pub use error::{ReaderError, ReaderResult};
pub use raster::Raster;
pub use reader::{
    ensure_mdr_version_supported, extract_year_month_day, AcquisitionInfo, L1bReader, Sensor,
    VariableSpec, LAT_VARIABLE_NAME, LON_VARIABLE_NAME, SUPPORTED_MDR_SUBCLASS,
    SUPPORTED_MDR_SUBCLASS_VERSION,
};
pub use registry::{VariableDefinition, VariableRegistry};
pub use time::{LineTimeLocator, StartStopTimeLocator, TimeLocator};
pub use window::{read_time_window, read_window, Interval, ACQUISITION_TIME_FILL};
