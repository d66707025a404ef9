//! Level-1B reader orchestration.
//!
//! Wires the record parser, variable registry and decode cache together for
//! one open product, and guards the MDR layout version before any payload is
//! decoded.

use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::info;

use eps_parser::{EpsDataType, RecordHeader};

use crate::attributes::{cf_attributes, CfAttribute};
use crate::cache::VariableCache;
use crate::error::{ReaderError, ReaderResult};
use crate::raster::Raster;
use crate::registry::VariableRegistry;
use crate::time::StartStopTimeLocator;
use crate::window::{read_time_window, read_window, Interval};

/// Name of the longitude variable in every packaged schema.
pub const LON_VARIABLE_NAME: &str = "longitude";
/// Name of the latitude variable in every packaged schema.
pub const LAT_VARIABLE_NAME: &str = "latitude";

/// The single MDR subclass this reader decodes.
pub const SUPPORTED_MDR_SUBCLASS: u8 = 2;
/// The single MDR subclass version this reader decodes.
pub const SUPPORTED_MDR_SUBCLASS_VERSION: u8 = 3;

/// The sensors with packaged Level-1B layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    AmsuA,
    Mhs,
}

impl Sensor {
    /// Cross-track FOV count per scan line, a fixed instrument constant.
    pub fn fov_count(&self) -> usize {
        match self {
            Sensor::AmsuA => 30,
            Sensor::Mhs => 90,
        }
    }

    /// Key of the packaged variable schema.
    pub fn resource_key(&self) -> &'static str {
        match self {
            Sensor::AmsuA => "AMSUA_L1B",
            Sensor::Mhs => "MHS_L1B",
        }
    }

    /// Filename pattern of this sensor's native products.
    pub fn filename_pattern(&self) -> &'static str {
        match self {
            Sensor::AmsuA => {
                r"AMSA_[A-Z0-9x]{3}_1B_M0[123]_[0-9]{14}Z_[0-9]{14}Z_[A-Z0-9x]_[A-Z0-9x]_[0-9]{14}Z\.nat"
            }
            Sensor::Mhs => {
                r"MHSx_[A-Z0-9x]{3}_1B_M0[123]_[0-9]{14}Z_[0-9]{14}Z_[A-Z0-9x]_[A-Z0-9x]_[0-9]{14}Z\.nat"
            }
        }
    }

    /// Whether `filename` is one of this sensor's products.
    pub fn matches_filename(&self, filename: &str) -> bool {
        Regex::new(&format!("^{}$", self.filename_pattern()))
            .map(|pattern| pattern.is_match(filename))
            .unwrap_or(false)
    }
}

/// Global acquisition metadata for the geometry consumer.
#[derive(Debug, Clone)]
pub struct AcquisitionInfo {
    pub product_name: String,
    pub sensing_start: DateTime<Utc>,
    pub sensing_stop: DateTime<Utc>,
}

/// One exposed variable with its resolved type and CF attributes, for the
/// metadata exporter.
#[derive(Debug, Clone)]
pub struct VariableSpec {
    pub name: String,
    pub data_type: EpsDataType,
    pub attributes: Vec<CfAttribute>,
}

/// Reject MDR layouts other than the single supported pair.
///
/// Decoding an incompatible layout would yield corrupted values with no
/// structural signal, so the guard runs at open, before any payload is
/// touched.
pub fn ensure_mdr_version_supported(header: &RecordHeader) -> ReaderResult<()> {
    if header.record_subclass != SUPPORTED_MDR_SUBCLASS
        || header.record_subclass_version != SUPPORTED_MDR_SUBCLASS_VERSION
    {
        return Err(ReaderError::UnsupportedMdrVersion {
            subclass: header.record_subclass,
            version: header.record_subclass_version,
        });
    }
    Ok(())
}

/// A reader over one open Level-1B product.
///
/// Owns the registry and decode cache for the product; dropping the reader
/// releases both, and a reopen parses and decodes from scratch.
pub struct L1bReader {
    sensor: Sensor,
    cache: VariableCache,
}

impl L1bReader {
    /// Open a native product file.
    pub fn open(sensor: Sensor, path: &Path) -> ReaderResult<Self> {
        let data = std::fs::read(path)?;
        info!(
            path = %path.display(),
            bytes = data.len(),
            sensor = ?sensor,
            "opening Level-1B product"
        );
        Self::from_bytes(sensor, Bytes::from(data))
    }

    /// Open a product already held in memory.
    pub fn from_bytes(sensor: Sensor, data: Bytes) -> ReaderResult<Self> {
        let registry = VariableRegistry::load(sensor.resource_key())?;
        let cache = VariableCache::new(data, registry, sensor.fov_count())?;

        let first_mdr = cache.mdrs().first().ok_or(ReaderError::MissingMdr)?;
        ensure_mdr_version_supported(&first_mdr.header)?;

        Ok(Self { sensor, cache })
    }

    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    /// Product raster size as `(width, height)` = `(num_fovs,
    /// num_scan_lines)`.
    pub fn product_size(&self) -> (usize, usize) {
        (self.cache.num_fovs(), self.cache.num_scan_lines())
    }

    /// Sensing period and product name from the MPHR.
    pub fn acquisition_info(&self) -> ReaderResult<AcquisitionInfo> {
        let mphr = self.cache.mphr();
        Ok(AcquisitionInfo {
            product_name: mphr.product_name()?,
            sensing_start: mphr.sensing_start()?,
            sensing_stop: mphr.sensing_stop()?,
        })
    }

    /// Line times interpolated across the sensing period.
    pub fn time_locator(&self) -> ReaderResult<StartStopTimeLocator> {
        let mphr = self.cache.mphr();
        Ok(StartStopTimeLocator::new(
            mphr.sensing_start()?,
            mphr.sensing_stop()?,
            self.cache.num_scan_lines(),
        ))
    }

    /// The full raw raster of a variable (memoized).
    pub fn raw_raster(&mut self, variable_name: &str) -> ReaderResult<&Raster> {
        self.cache.get_raw(variable_name)
    }

    /// The full physically-scaled raster of a variable.
    pub fn scaled_raster(&mut self, variable_name: &str) -> ReaderResult<Raster> {
        self.cache.get_scaled(variable_name)
    }

    /// Cut a raw sample window around a center pixel; out-of-raster cells
    /// carry the variable type's fill sentinel.
    pub fn read_raw(
        &mut self,
        center_x: i32,
        center_y: i32,
        window: Interval,
        variable_name: &str,
    ) -> ReaderResult<Raster> {
        let fill = self
            .cache
            .registry()
            .get_variable_def(variable_name)?
            .data_type()?
            .fill_value();
        let raw = self.cache.get_raw(variable_name)?;
        Ok(read_window(raw, center_x, center_y, window, fill))
    }

    /// Cut a physically-scaled sample window; fill cells keep the sentinel.
    pub fn read_scaled(
        &mut self,
        center_x: i32,
        center_y: i32,
        window: Interval,
        variable_name: &str,
    ) -> ReaderResult<Raster> {
        let definition = self.cache.registry().get_variable_def(variable_name)?;
        let scale_factor = definition.scale_factor;
        let fill = definition.data_type()?.fill_value();

        let raw_window = self.read_raw(center_x, center_y, window, variable_name)?;
        if scale_factor == 1.0 {
            return Ok(raw_window);
        }
        Ok(raw_window.map(|value| {
            if value == fill {
                fill
            } else {
                value * scale_factor
            }
        }))
    }

    /// Cut an acquisition-time window (epoch seconds) around a pixel.
    pub fn read_acquisition_time(
        &mut self,
        center_x: i32,
        center_y: i32,
        window: Interval,
    ) -> ReaderResult<Raster<i32>> {
        let locator = self.time_locator()?;
        let (width, height) = self.product_size();
        Ok(read_time_window(
            &locator, center_x, center_y, window, width, height,
        ))
    }

    /// Every registry variable with its resolved data type and CF
    /// attributes, ordered by name.
    pub fn variables(&self) -> ReaderResult<Vec<VariableSpec>> {
        let mut specs = Vec::new();
        for (name, definition) in self.cache.registry().variables() {
            specs.push(VariableSpec {
                name: name.clone(),
                data_type: definition.data_type()?,
                attributes: cf_attributes(definition)?,
            });
        }
        Ok(specs)
    }

    /// Release the decode cache and close the reader.
    pub fn close(mut self) {
        self.cache.clear();
    }
}

/// Extract `(year, month, day)` from an EPS product filename.
///
/// The sensing start timestamp is the fifth underscore-separated field.
pub fn extract_year_month_day(filename: &str) -> ReaderResult<(i32, u32, u32)> {
    let field = filename
        .split('_')
        .nth(4)
        .filter(|field| field.len() >= 8)
        .ok_or_else(|| ReaderError::InvalidFilename(filename.to_string()))?;

    let parse = |range: std::ops::Range<usize>| {
        field[range]
            .parse::<u32>()
            .map_err(|_| ReaderError::InvalidFilename(filename.to_string()))
    };

    Ok((parse(0..4)? as i32, parse(4..6)?, parse(6..8)?))
}
