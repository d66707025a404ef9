//! Main Product Header Record accessors.
//!
//! The MPHR payload is fixed-width ASCII text, one `KEY  = value` entry per
//! line. Accessors scan the text on demand; the record itself stays a plain
//! byte slice of the product buffer.

use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{EpsError, EpsResult};
use crate::records::RecordHeader;

/// Attribute key of the sensing start timestamp.
pub const SENSING_START_KEY: &str = "SENSING_START";
/// Attribute key of the sensing stop timestamp.
pub const SENSING_STOP_KEY: &str = "SENSING_END";

/// The Main Product Header Record, one per product file.
#[derive(Debug, Clone)]
pub struct Mphr {
    pub header: RecordHeader,
    pub payload: Bytes,
}

impl Mphr {
    /// Full record bytes, generic header included.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Look up a textual attribute by key.
    ///
    /// Scans the payload for a `KEY  = value` line and returns the trimmed
    /// value. A missing key is an error; the MPHR carries a closed set of
    /// global metadata entries, so absence means a malformed product.
    pub fn attribute(&self, key: &str) -> EpsResult<String> {
        let text = String::from_utf8_lossy(&self.payload);
        for line in text.lines() {
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            if name.trim() == key {
                return Ok(value.trim().to_string());
            }
        }
        Err(EpsError::AttributeNotFound(key.to_string()))
    }

    /// The product name from the `PRODUCT_NAME` attribute.
    pub fn product_name(&self) -> EpsResult<String> {
        self.attribute("PRODUCT_NAME")
    }

    /// Sensing start time from the `SENSING_START` attribute.
    pub fn sensing_start(&self) -> EpsResult<DateTime<Utc>> {
        self.date_attribute(SENSING_START_KEY)
    }

    /// Sensing stop time from the `SENSING_END` attribute.
    pub fn sensing_stop(&self) -> EpsResult<DateTime<Utc>> {
        self.date_attribute(SENSING_STOP_KEY)
    }

    /// Parse a `yyyyMMddHHmmssZ` attribute value as a UTC timestamp.
    pub fn date_attribute(&self, key: &str) -> EpsResult<DateTime<Utc>> {
        let value = self.attribute(key)?;
        parse_eps_time(&value).ok_or_else(|| EpsError::InvalidTime {
            key: key.to_string(),
            value,
        })
    }
}

/// Parse an EPS text timestamp, `yyyyMMddHHmmss` with a mandatory `Z` zone
/// designator.
fn parse_eps_time(value: &str) -> Option<DateTime<Utc>> {
    let stamp = value.strip_suffix('Z')?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").ok()?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}
