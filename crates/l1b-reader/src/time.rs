//! Per-line acquisition time.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::raster::Raster;

/// Maps a pixel position to its acquisition time.
///
/// Scan instruments acquire one line at a time, so implementations depend
/// only on the line index; the x coordinate is accepted for interface
/// symmetry with the raster accessors.
pub trait TimeLocator {
    fn time_for(&self, x: usize, y: usize) -> DateTime<Utc>;
}

/// Line times interpolated between the MPHR sensing start and stop dates.
///
/// The product header carries only the orbit's start and stop timestamps;
/// line times are spread linearly across the scan lines, in millisecond
/// arithmetic with rounding.
#[derive(Debug, Clone)]
pub struct StartStopTimeLocator {
    start: DateTime<Utc>,
    increment_millis: f64,
}

impl StartStopTimeLocator {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>, num_lines: usize) -> Self {
        let delta = (stop.timestamp_millis() - start.timestamp_millis()) as f64;
        let increment_millis = if num_lines > 1 {
            delta / (num_lines - 1) as f64
        } else {
            0.0
        };
        Self {
            start,
            increment_millis,
        }
    }
}

impl TimeLocator for StartStopTimeLocator {
    fn time_for(&self, _x: usize, y: usize) -> DateTime<Utc> {
        let offset_millis = (y as f64 * self.increment_millis).round() as i64;
        self.start + Duration::milliseconds(offset_millis)
    }
}

/// Line times taken from decoded per-line timestamps.
#[derive(Debug, Clone)]
pub struct LineTimeLocator {
    line_times: Vec<DateTime<Utc>>,
}

impl LineTimeLocator {
    pub fn new(line_times: Vec<DateTime<Utc>>) -> Self {
        Self { line_times }
    }

    /// Build from a decoded raster of epoch seconds, one value per scan
    /// line (the first FOV's sample is taken as the line time).
    pub fn from_epoch_seconds(raster: &Raster) -> Self {
        let line_times = (0..raster.height())
            .map(|y| {
                let seconds = raster.get(0, y).unwrap_or(0.0);
                Utc.timestamp_millis_opt((seconds * 1000.0).round() as i64)
                    .single()
                    .unwrap_or_default()
            })
            .collect();
        Self { line_times }
    }
}

impl TimeLocator for LineTimeLocator {
    fn time_for(&self, _x: usize, y: usize) -> DateTime<Utc> {
        let index = y.min(self.line_times.len().saturating_sub(1));
        self.line_times.get(index).copied().unwrap_or_default()
    }
}
