//! EPS record stream parsing.
//!
//! An EPS native product is a flat sequence of variable-length records. Each
//! record starts with a 20-byte generic header that identifies its class and
//! carries its total size, so the stream can be walked without knowledge of
//! the individual record layouts.

use bytes::Bytes;
use tracing::debug;

use crate::error::{EpsError, EpsResult};
use crate::mphr::Mphr;
use crate::GENERIC_RECORD_HEADER_SIZE;

/// Record class codes from the EPS generic record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    Reserved,
    /// Main Product Header Record
    Mphr,
    /// Secondary Product Header Record
    Sphr,
    /// Internal Pointer Record
    Ipr,
    /// Global External Auxiliary Data Record
    Geadr,
    /// Global Internal Auxiliary Data Record
    Giadr,
    /// Variable External Auxiliary Data Record
    Veadr,
    /// Variable Internal Auxiliary Data Record
    Viadr,
    /// Measurement Data Record
    Mdr,
}

impl RecordClass {
    pub fn from_byte(b: u8) -> EpsResult<Self> {
        match b {
            0 => Ok(Self::Reserved),
            1 => Ok(Self::Mphr),
            2 => Ok(Self::Sphr),
            3 => Ok(Self::Ipr),
            4 => Ok(Self::Geadr),
            5 => Ok(Self::Giadr),
            6 => Ok(Self::Veadr),
            7 => Ok(Self::Viadr),
            8 => Ok(Self::Mdr),
            other => Err(EpsError::UnknownRecordClass(other)),
        }
    }
}

/// Instrument group codes from the EPS generic record header.
///
/// The numeric gaps (14, 16..98) are reserved by the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentGroup {
    Generic,
    AmsuA,
    Ascat,
    Atovs,
    Avhrr3,
    Gome,
    Gras,
    Hirs4,
    Iasi,
    Mhs,
    Sem,
    Adcs,
    Sbuv,
    Dummy,
    IasiL2,
    Archive,
}

impl InstrumentGroup {
    pub fn from_byte(b: u8) -> EpsResult<Self> {
        match b {
            0 => Ok(Self::Generic),
            1 => Ok(Self::AmsuA),
            2 => Ok(Self::Ascat),
            3 => Ok(Self::Atovs),
            4 => Ok(Self::Avhrr3),
            5 => Ok(Self::Gome),
            6 => Ok(Self::Gras),
            7 => Ok(Self::Hirs4),
            8 => Ok(Self::Iasi),
            9 => Ok(Self::Mhs),
            10 => Ok(Self::Sem),
            11 => Ok(Self::Adcs),
            12 => Ok(Self::Sbuv),
            13 => Ok(Self::Dummy),
            15 => Ok(Self::IasiL2),
            99 => Ok(Self::Archive),
            other => Err(EpsError::UnknownInstrumentGroup(other)),
        }
    }
}

/// The 20-byte generic record header.
///
/// Layout:
/// - Byte 0: record class
/// - Byte 1: instrument group
/// - Byte 2: record subclass
/// - Byte 3: record subclass version
/// - Bytes 4-7: record size (u32, big-endian), counted from the start of
///   this header, header included
/// - Bytes 8-19: record start/stop time stamps (not interpreted here)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_class: RecordClass,
    pub instrument_group: InstrumentGroup,
    pub record_subclass: u8,
    pub record_subclass_version: u8,
    pub record_size: u32,
}

impl RecordHeader {
    /// Parse a generic record header from the first 20 bytes of `data`.
    pub fn parse(data: &[u8]) -> EpsResult<Self> {
        if data.len() < GENERIC_RECORD_HEADER_SIZE {
            return Err(EpsError::TruncatedHeader {
                offset: 0,
                remaining: data.len(),
            });
        }

        let record_class = RecordClass::from_byte(data[0])?;
        let instrument_group = InstrumentGroup::from_byte(data[1])?;
        let record_subclass = data[2];
        let record_subclass_version = data[3];
        let record_size = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

        Ok(Self {
            record_class,
            instrument_group,
            record_subclass,
            record_subclass_version,
            record_size,
        })
    }
}

/// A record whose class has no dedicated accessors.
#[derive(Debug, Clone)]
pub struct GenericRecord {
    pub header: RecordHeader,
    pub payload: Bytes,
}

/// A Measurement Data Record, one per scan line.
///
/// The payload holds all FOVs' packed raw samples for the line; the variable
/// registry describes where each physical field lives inside it.
#[derive(Debug, Clone)]
pub struct Mdr {
    pub header: RecordHeader,
    pub payload: Bytes,
}

impl Mdr {
    /// Full record bytes, generic header included.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// A parsed EPS record, classified by its header's record class.
#[derive(Debug, Clone)]
pub enum Record {
    Mphr(Mphr),
    Mdr(Mdr),
    Generic(GenericRecord),
}

impl Record {
    pub fn header(&self) -> &RecordHeader {
        match self {
            Record::Mphr(mphr) => &mphr.header,
            Record::Mdr(mdr) => &mdr.header,
            Record::Generic(generic) => &generic.header,
        }
    }

    fn classify(header: RecordHeader, payload: Bytes) -> Record {
        match header.record_class {
            RecordClass::Mphr => Record::Mphr(Mphr { header, payload }),
            RecordClass::Mdr => Record::Mdr(Mdr { header, payload }),
            _ => Record::Generic(GenericRecord { header, payload }),
        }
    }
}

/// Parse a complete EPS record stream, keeping every record class.
///
/// Walks the buffer from offset 0: reads the 20-byte generic header, slices
/// the full `record_size` bytes (header included) and advances by
/// `record_size`, until the buffer is exhausted. Any structural problem
/// (unknown class or instrument group, truncated header or record) aborts the
/// whole parse; no partial record list is returned.
pub fn parse_records(data: &Bytes) -> EpsResult<Vec<Record>> {
    walk_records(data, |_| true)
}

/// Parse an EPS record stream keeping only MPHR and MDR records.
///
/// Used for lightweight ingestion scans. Skipped records still advance the
/// walk by their full `record_size` and still have their headers validated,
/// so record boundaries are tracked exactly as in [`parse_records`].
pub fn parse_records_for_ingestion(data: &Bytes) -> EpsResult<Vec<Record>> {
    walk_records(data, |class| {
        matches!(class, RecordClass::Mphr | RecordClass::Mdr)
    })
}

fn walk_records(data: &Bytes, keep: impl Fn(RecordClass) -> bool) -> EpsResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut offset = 0usize;

    while offset < data.len() {
        let remaining = data.len() - offset;
        if remaining < GENERIC_RECORD_HEADER_SIZE {
            return Err(EpsError::TruncatedHeader { offset, remaining });
        }

        let header = RecordHeader::parse(&data[offset..])?;
        let record_size = header.record_size as usize;

        if record_size < GENERIC_RECORD_HEADER_SIZE {
            return Err(EpsError::InvalidRecordSize {
                offset,
                record_size,
            });
        }
        if record_size > remaining {
            return Err(EpsError::TruncatedRecord {
                offset,
                record_size,
                remaining,
            });
        }

        if keep(header.record_class) {
            let payload = data.slice(offset..offset + record_size);
            records.push(Record::classify(header, payload));
        }

        offset += record_size;
    }

    debug!(records = records.len(), bytes = data.len(), "parsed EPS record stream");
    Ok(records)
}

/// Collect the MDR records from a parsed stream, in scan-line order.
pub fn mdr_records(records: &[Record]) -> Vec<&Mdr> {
    records
        .iter()
        .filter_map(|record| match record {
            Record::Mdr(mdr) => Some(mdr),
            _ => None,
        })
        .collect()
}

/// Find the Main Product Header Record of a parsed stream.
pub fn mphr_record(records: &[Record]) -> Option<&Mphr> {
    records.iter().find_map(|record| match record {
        Record::Mphr(mphr) => Some(mphr),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_record(class: u8, group: u8, size: u32, fill: u8) -> Vec<u8> {
        let mut record = vec![0u8; size as usize];
        record[0] = class;
        record[1] = group;
        record[2] = 0;
        record[3] = 1;
        record[4..8].copy_from_slice(&size.to_be_bytes());
        for byte in record.iter_mut().skip(GENERIC_RECORD_HEADER_SIZE) {
            *byte = fill;
        }
        record
    }

    #[test]
    fn test_header_parse() {
        let mut data = vec![0u8; GENERIC_RECORD_HEADER_SIZE];
        data[0] = 1; // MPHR
        data[1] = 9; // MHS
        data[2] = 2;
        data[3] = 3;
        data[4..8].copy_from_slice(&100u32.to_be_bytes());

        let header = RecordHeader::parse(&data).unwrap();
        assert_eq!(header.record_class, RecordClass::Mphr);
        assert_eq!(header.instrument_group, InstrumentGroup::Mhs);
        assert_eq!(header.record_subclass, 2);
        assert_eq!(header.record_subclass_version, 3);
        assert_eq!(header.record_size, 100);
    }

    #[test]
    fn test_header_parse_truncated() {
        let data = [1u8, 9, 0, 0, 0, 0, 0, 100];
        assert!(matches!(
            RecordHeader::parse(&data),
            Err(EpsError::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn test_record_class_from_byte() {
        assert_eq!(RecordClass::from_byte(0).unwrap(), RecordClass::Reserved);
        assert_eq!(RecordClass::from_byte(1).unwrap(), RecordClass::Mphr);
        assert_eq!(RecordClass::from_byte(2).unwrap(), RecordClass::Sphr);
        assert_eq!(RecordClass::from_byte(3).unwrap(), RecordClass::Ipr);
        assert_eq!(RecordClass::from_byte(4).unwrap(), RecordClass::Geadr);
        assert_eq!(RecordClass::from_byte(5).unwrap(), RecordClass::Giadr);
        assert_eq!(RecordClass::from_byte(6).unwrap(), RecordClass::Veadr);
        assert_eq!(RecordClass::from_byte(7).unwrap(), RecordClass::Viadr);
        assert_eq!(RecordClass::from_byte(8).unwrap(), RecordClass::Mdr);
        assert!(matches!(
            RecordClass::from_byte(9),
            Err(EpsError::UnknownRecordClass(9))
        ));
    }

    #[test]
    fn test_instrument_group_from_byte() {
        assert_eq!(
            InstrumentGroup::from_byte(0).unwrap(),
            InstrumentGroup::Generic
        );
        assert_eq!(
            InstrumentGroup::from_byte(1).unwrap(),
            InstrumentGroup::AmsuA
        );
        assert_eq!(InstrumentGroup::from_byte(9).unwrap(), InstrumentGroup::Mhs);
        assert_eq!(
            InstrumentGroup::from_byte(15).unwrap(),
            InstrumentGroup::IasiL2
        );
        assert_eq!(
            InstrumentGroup::from_byte(99).unwrap(),
            InstrumentGroup::Archive
        );
        // 14 is a reserved gap
        assert!(matches!(
            InstrumentGroup::from_byte(14),
            Err(EpsError::UnknownInstrumentGroup(14))
        ));
    }

    #[test]
    fn test_parse_records() {
        let mut all_bytes = Vec::new();
        all_bytes.extend(dummy_record(1, 0, 24, 0x11)); // MPHR
        all_bytes.extend(dummy_record(0, 0, 28, 0x22)); // RESERVED
        all_bytes.extend(dummy_record(2, 0, 28, 0x55)); // SPHR
        all_bytes.extend(dummy_record(8, 1, 64, 0x33)); // MDR
        all_bytes.extend(dummy_record(8, 1, 128, 0x44)); // MDR

        let records = parse_records(&Bytes::from(all_bytes)).unwrap();

        assert_eq!(records.len(), 5);
        assert!(matches!(records[0], Record::Mphr(_)));
        assert!(matches!(records[1], Record::Generic(_)));
        assert!(matches!(records[2], Record::Generic(_)));
        assert!(matches!(records[3], Record::Mdr(_)));
        assert!(matches!(records[4], Record::Mdr(_)));

        assert_eq!(records[3].header().record_size, 64);
        if let Record::Mdr(mdr) = &records[4] {
            assert_eq!(mdr.payload().len(), 128);
            assert_eq!(mdr.payload()[GENERIC_RECORD_HEADER_SIZE], 0x44);
        }
    }

    #[test]
    fn test_parse_records_for_ingestion() {
        let mut all_bytes = Vec::new();
        all_bytes.extend(dummy_record(1, 0, 24, 0x11)); // MPHR
        all_bytes.extend(dummy_record(3, 0, 40, 0x22)); // IPR, skipped
        all_bytes.extend(dummy_record(5, 0, 36, 0x55)); // GIADR, skipped
        all_bytes.extend(dummy_record(8, 1, 64, 0x33)); // MDR

        let records = parse_records_for_ingestion(&Bytes::from(all_bytes)).unwrap();

        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], Record::Mphr(_)));
        assert!(matches!(records[1], Record::Mdr(_)));
        // the skipped records were stepped over at full size
        if let Record::Mdr(mdr) = &records[1] {
            assert_eq!(mdr.payload()[GENERIC_RECORD_HEADER_SIZE], 0x33);
        }
    }

    #[test]
    fn test_parse_records_unknown_class_is_fatal() {
        let mut all_bytes = Vec::new();
        all_bytes.extend(dummy_record(1, 0, 24, 0x11));
        all_bytes.extend(dummy_record(17, 0, 24, 0x22));

        let result = parse_records(&Bytes::from(all_bytes));
        assert!(matches!(result, Err(EpsError::UnknownRecordClass(17))));
    }

    #[test]
    fn test_parse_records_truncated_record_is_fatal() {
        let mut all_bytes = dummy_record(1, 0, 24, 0x11);
        all_bytes.extend(dummy_record(8, 1, 64, 0x33));
        all_bytes.truncate(all_bytes.len() - 10);

        let result = parse_records(&Bytes::from(all_bytes));
        assert!(matches!(
            result,
            Err(EpsError::TruncatedRecord {
                offset: 24,
                record_size: 64,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_records_undersized_record_is_fatal() {
        let mut record = dummy_record(1, 0, 24, 0x11);
        record[4..8].copy_from_slice(&8u32.to_be_bytes());

        let result = parse_records(&Bytes::from(record));
        assert!(matches!(
            result,
            Err(EpsError::InvalidRecordSize { record_size: 8, .. })
        ));
    }

    #[test]
    fn test_record_helpers() {
        let mut all_bytes = Vec::new();
        all_bytes.extend(dummy_record(1, 0, 24, 0x11));
        all_bytes.extend(dummy_record(8, 1, 64, 0x33));
        all_bytes.extend(dummy_record(8, 1, 64, 0x44));

        let records = parse_records(&Bytes::from(all_bytes)).unwrap();

        assert!(mphr_record(&records).is_some());
        let mdrs = mdr_records(&records);
        assert_eq!(mdrs.len(), 2);
        assert_eq!(mdrs[0].payload()[GENERIC_RECORD_HEADER_SIZE], 0x33);
        assert_eq!(mdrs[1].payload()[GENERIC_RECORD_HEADER_SIZE], 0x44);
    }
}
