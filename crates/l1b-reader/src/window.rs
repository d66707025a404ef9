//! Boundary-aware windowed extraction.
//!
//! Matchup sampling cuts fixed-size windows around a center pixel. Windows
//! that reach past the swath edge are an expected, common case: every mapped
//! source coordinate outside the raster is filled with the variable's
//! sentinel value, never treated as an error.

use chrono::{DateTime, Utc};

use crate::raster::Raster;
use crate::time::TimeLocator;

/// Fill sentinel for acquisition-time windows (epoch seconds).
pub const ACQUISITION_TIME_FILL: i32 = i32::MIN;

/// A requested window size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub x: usize,
    pub y: usize,
}

impl Interval {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Cut a `window.x × window.y` sub-raster centered on `(center_x, center_y)`.
///
/// Output cell `(window.x / 2, window.y / 2)` maps to the center pixel and
/// cell `(ox, oy)` maps to source `(center_x - window.x/2 + ox,
/// center_y - window.y/2 + oy)`; out-of-raster source coordinates yield
/// `fill`.
pub fn read_window<T: Copy>(
    raster: &Raster<T>,
    center_x: i32,
    center_y: i32,
    window: Interval,
    fill: T,
) -> Raster<T> {
    let half_width = (window.x / 2) as i64;
    let half_height = (window.y / 2) as i64;

    let mut out = Raster::filled(window.x, window.y, fill);
    for oy in 0..window.y {
        let source_y = center_y as i64 - half_height + oy as i64;
        for ox in 0..window.x {
            let source_x = center_x as i64 - half_width + ox as i64;
            if let Some(value) = get_signed(raster, source_x, source_y) {
                out.set(ox, oy, value);
            }
        }
    }
    out
}

/// Cut an acquisition-time window as epoch seconds.
///
/// Each output row's time is computed once from the locator and broadcast
/// across the row; rows outside the raster height and columns outside the
/// raster width receive [`ACQUISITION_TIME_FILL`] independent of the row
/// time.
pub fn read_time_window(
    locator: &dyn TimeLocator,
    center_x: i32,
    center_y: i32,
    window: Interval,
    raster_width: usize,
    raster_height: usize,
) -> Raster<i32> {
    let half_width = (window.x / 2) as i64;
    let half_height = (window.y / 2) as i64;

    let mut out = Raster::filled(window.x, window.y, ACQUISITION_TIME_FILL);
    for oy in 0..window.y {
        let source_y = center_y as i64 - half_height + oy as i64;
        if source_y < 0 || source_y as usize >= raster_height {
            continue;
        }

        let line_time = locator.time_for(center_x.max(0) as usize, source_y as usize);
        let line_seconds = epoch_seconds(line_time);

        for ox in 0..window.x {
            let source_x = center_x as i64 - half_width + ox as i64;
            if source_x >= 0 && (source_x as usize) < raster_width {
                out.set(ox, oy, line_seconds);
            }
        }
    }
    out
}

fn get_signed<T: Copy>(raster: &Raster<T>, x: i64, y: i64) -> Option<T> {
    if x < 0 || y < 0 {
        return None;
    }
    raster.get(x as usize, y as usize)
}

fn epoch_seconds(time: DateTime<Utc>) -> i32 {
    (time.timestamp_millis() as f64 / 1000.0).round() as i32
}
