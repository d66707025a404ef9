//! Error types for EPS native format parsing.

use thiserror::Error;

/// Errors that can occur while parsing an EPS native product.
#[derive(Error, Debug)]
pub enum EpsError {
    /// The record class byte is not one of the nine defined classes.
    #[error("unknown record class: {0}")]
    UnknownRecordClass(u8),

    /// The instrument group byte is not one of the defined codes.
    #[error("unknown instrument group: {0}")]
    UnknownInstrumentGroup(u8),

    /// The buffer ended inside a generic record header.
    #[error("truncated record header at offset {offset}: {remaining} bytes remaining")]
    TruncatedHeader { offset: usize, remaining: usize },

    /// A record claims more bytes than the buffer holds.
    #[error("truncated record at offset {offset}: header claims {record_size} bytes, {remaining} remaining")]
    TruncatedRecord {
        offset: usize,
        record_size: usize,
        remaining: usize,
    },

    /// The record size field is smaller than the header itself.
    #[error("invalid record size {record_size} at offset {offset}")]
    InvalidRecordSize { offset: usize, record_size: usize },

    /// A read past the end of a record payload.
    #[error("read of {size} bytes at offset {offset} exceeds record of {record_len} bytes")]
    OutOfBounds {
        offset: usize,
        size: usize,
        record_len: usize,
    },

    /// A schema data type string that is not one of the nine EPS types.
    #[error("unknown data type: {0}")]
    UnknownDataType(String),

    /// A requested MPHR attribute is not present in the payload.
    #[error("{0} not found in MPHR payload")]
    AttributeNotFound(String),

    /// An MPHR timestamp that does not follow `yyyyMMddHHmmssZ`.
    #[error("could not parse {key} time: {value}")]
    InvalidTime { key: String, value: String },
}

/// Result type for EPS parsing operations.
pub type EpsResult<T> = std::result::Result<T, EpsError>;
