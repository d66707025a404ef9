//! Test data generation utilities.
//!
//! Builds small synthetic EPS native products with known payload values for
//! use in unit and integration tests. Generated products follow the packaged
//! variable schemas exactly: the AMSU-A layout packs 15 interleaved radiance
//! channels, the angular-relation quartet, earth locations, surface
//! properties and terrain elevation into each 2580-byte MDR; the MHS layout
//! carries its earth locations at the MHS offsets.

use eps_parser::GENERIC_RECORD_HEADER_SIZE;

/// AMSU-A MDR record size in bytes.
pub const AMSUA_MDR_SIZE: usize = 2580;
/// MHS MDR record size in bytes.
pub const MHS_MDR_SIZE: usize = 4040;

const AMSUA_FOV_COUNT: usize = 30;
const MHS_FOV_COUNT: usize = 90;

const AMSUA_RADIANCE_OFFSET: usize = 42;
const AMSUA_ANGLES_OFFSET: usize = 1842;
const AMSUA_EARTH_LOCATIONS_OFFSET: usize = 2082;
const AMSUA_SURFACE_PROPERTY_OFFSET: usize = 2322;
const AMSUA_TERRAIN_ELEVATION_OFFSET: usize = 2382;

const MHS_EARTH_LOCATIONS_OFFSET: usize = 3318;

/// Expected raw latitude at `(y, x)` in a generated AMSU-A product.
pub fn amsua_latitude_raw(y: usize, x: usize) -> i32 {
    655_792 + (y * AMSUA_FOV_COUNT + x) as i32
}

/// Expected raw longitude at `(y, x)` in a generated AMSU-A product.
pub fn amsua_longitude_raw(y: usize, x: usize) -> i32 {
    -1_680_057 + (y * AMSUA_FOV_COUNT + x) as i32
}

/// Expected raw radiance for channel `c` (0-based) at `(y, x)`.
pub fn amsua_radiance_raw(y: usize, x: usize, c: usize) -> i32 {
    21_796 + 1_000 * c as i32 + 10 * x as i32 + y as i32
}

/// Expected raw latitude at `(y, x)` in a generated MHS product.
pub fn mhs_latitude_raw(y: usize, x: usize) -> i32 {
    700_000 + (y * MHS_FOV_COUNT + x) as i32
}

/// Expected raw longitude at `(y, x)` in a generated MHS product.
pub fn mhs_longitude_raw(y: usize, x: usize) -> i32 {
    -500_000 + (y * MHS_FOV_COUNT + x) as i32
}

/// Build a synthetic AMSU-A Level-1B product with the supported MDR version.
pub fn amsua_product(num_scan_lines: usize) -> Vec<u8> {
    amsua_product_with_version(num_scan_lines, 2, 3)
}

/// Build a synthetic AMSU-A product with an explicit MDR subclass/version,
/// for exercising the reader's version guard.
pub fn amsua_product_with_version(num_scan_lines: usize, subclass: u8, version: u8) -> Vec<u8> {
    let mut product = Vec::new();

    product.extend(mphr_record(
        "AMSA_xxx_1B_M03_20250820060350Z_20250820074550Z_N_O_20250820074043Z",
    ));
    // an auxiliary record the ingestion scan must step over
    product.extend(generic_record(5, 1, 128));

    for y in 0..num_scan_lines {
        let mut mdr = vec![0u8; AMSUA_MDR_SIZE];
        write_header(&mut mdr, 8, 1, subclass, version, AMSUA_MDR_SIZE as u32);

        for x in 0..AMSUA_FOV_COUNT {
            for c in 0..15 {
                put_i32(
                    &mut mdr,
                    AMSUA_RADIANCE_OFFSET + x * 60 + 4 * c,
                    amsua_radiance_raw(y, x, c),
                );
            }
            for a in 0..4 {
                put_i16(
                    &mut mdr,
                    AMSUA_ANGLES_OFFSET + x * 8 + 2 * a,
                    (100 * (a as i16 + 1)) + x as i16,
                );
            }
            put_i32(
                &mut mdr,
                AMSUA_EARTH_LOCATIONS_OFFSET + x * 8,
                amsua_latitude_raw(y, x),
            );
            put_i32(
                &mut mdr,
                AMSUA_EARTH_LOCATIONS_OFFSET + 4 + x * 8,
                amsua_longitude_raw(y, x),
            );
            put_i16(
                &mut mdr,
                AMSUA_SURFACE_PROPERTY_OFFSET + x * 2,
                (x % 3) as i16,
            );
            put_i16(
                &mut mdr,
                AMSUA_TERRAIN_ELEVATION_OFFSET + x * 2,
                100 + x as i16,
            );
        }

        product.extend(mdr);
    }

    product
}

/// Build a synthetic MHS Level-1B product with the supported MDR version.
pub fn mhs_product(num_scan_lines: usize) -> Vec<u8> {
    let mut product = Vec::new();

    product.extend(mphr_record(
        "MHSx_xxx_1B_M03_20250820060350Z_20250820074550Z_N_O_20250820074043Z",
    ));

    for y in 0..num_scan_lines {
        let mut mdr = vec![0u8; MHS_MDR_SIZE];
        write_header(&mut mdr, 8, 9, 2, 3, MHS_MDR_SIZE as u32);

        for x in 0..MHS_FOV_COUNT {
            put_i32(
                &mut mdr,
                MHS_EARTH_LOCATIONS_OFFSET + x * 8,
                mhs_latitude_raw(y, x),
            );
            put_i32(
                &mut mdr,
                MHS_EARTH_LOCATIONS_OFFSET + 4 + x * 8,
                mhs_longitude_raw(y, x),
            );
        }

        product.extend(mdr);
    }

    product
}

fn mphr_record(product_name: &str) -> Vec<u8> {
    let text = format!(
        "PRODUCT_NAME                  = {product_name}\n\
         INSTRUMENT_MODEL              =   1\n\
         PROCESSING_LEVEL              = 1B\n\
         SPACECRAFT_ID                 = M03\n\
         SENSING_START                 = 20250820060350Z\n\
         SENSING_END                   = 20250820074550Z\n\
         PROCESSING_CENTRE             = CGS1\n\
         PROCESSING_MODE               = N\n"
    );

    let record_size = GENERIC_RECORD_HEADER_SIZE + text.len();
    let mut record = vec![0u8; record_size];
    write_header(&mut record, 1, 0, 0, 2, record_size as u32);
    record[GENERIC_RECORD_HEADER_SIZE..].copy_from_slice(text.as_bytes());
    record
}

fn generic_record(class: u8, group: u8, size: usize) -> Vec<u8> {
    let mut record = vec![0u8; size];
    write_header(&mut record, class, group, 0, 1, size as u32);
    record
}

fn write_header(record: &mut [u8], class: u8, group: u8, subclass: u8, version: u8, size: u32) {
    record[0] = class;
    record[1] = group;
    record[2] = subclass;
    record[3] = version;
    record[4..8].copy_from_slice(&size.to_be_bytes());
}

fn put_i32(record: &mut [u8], offset: usize, value: i32) {
    record[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn put_i16(record: &mut [u8], offset: usize, value: i16) {
    record[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}
