//! EPS/MetOp native format parser.
//!
//! This crate provides a pure Rust implementation for parsing EPS native
//! products (the `.nat` container used by the MetOp Level-1B ground segment):
//! a sequence of self-describing, variable-length records, each prefixed by a
//! 20-byte generic record header.

pub mod datatypes;
pub mod error;
pub mod mphr;
pub mod records;

pub use datatypes::EpsDataType;
pub use error::{EpsError, EpsResult};
pub use mphr::Mphr;
pub use records::{
    mdr_records, mphr_record, parse_records, parse_records_for_ingestion, GenericRecord,
    InstrumentGroup, Mdr, Record, RecordClass, RecordHeader,
};

/// Size of the generic record header prefixed to every EPS record.
pub const GENERIC_RECORD_HEADER_SIZE: usize = 20;
