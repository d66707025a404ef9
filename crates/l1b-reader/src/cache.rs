//! Memoized per-variable decode of MDR payloads.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use eps_parser::{mdr_records, mphr_record, parse_records_for_ingestion, Mdr, Mphr};

use crate::error::{ReaderError, ReaderResult};
use crate::raster::Raster;
use crate::registry::{VariableDefinition, VariableRegistry};

/// Decode cache for one open product.
///
/// Parses the record stream once at construction and decodes each variable's
/// full `[num_scan_lines, num_fovs]` raster lazily, on first request. A
/// typical caller touches a handful of the declared fields, but pays each
/// field's full-raster decode cost only once.
///
/// Not safe for concurrent use; each reader instance owns its own cache.
pub struct VariableCache {
    mphr: Mphr,
    mdrs: Vec<Mdr>,
    registry: VariableRegistry,
    num_fovs: usize,
    raw: HashMap<String, Raster>,
}

impl VariableCache {
    /// Parse a product buffer and set up an empty cache over its MDRs.
    pub fn new(data: Bytes, registry: VariableRegistry, num_fovs: usize) -> ReaderResult<Self> {
        let records = parse_records_for_ingestion(&data)?;

        let mphr = mphr_record(&records)
            .cloned()
            .ok_or(ReaderError::MissingMphr)?;
        let mdrs: Vec<Mdr> = mdr_records(&records).into_iter().cloned().collect();

        debug!(scan_lines = mdrs.len(), num_fovs, "initialized variable cache");

        Ok(Self {
            mphr,
            mdrs,
            registry,
            num_fovs,
            raw: HashMap::new(),
        })
    }

    /// The product's Main Product Header Record.
    pub fn mphr(&self) -> &Mphr {
        &self.mphr
    }

    /// The product's MDRs in scan-line order.
    pub fn mdrs(&self) -> &[Mdr] {
        &self.mdrs
    }

    /// The registry this cache decodes against.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Number of scan lines, i.e. the MDR count.
    pub fn num_scan_lines(&self) -> usize {
        self.mdrs.len()
    }

    /// Number of FOVs per scan line, a fixed sensor constant.
    pub fn num_fovs(&self) -> usize {
        self.num_fovs
    }

    /// The raw (unscaled) raster of a variable, decoded on first request and
    /// memoized for the cache lifetime. Repeated calls return the same
    /// allocation.
    pub fn get_raw(&mut self, variable_name: &str) -> ReaderResult<&Raster> {
        if !self.raw.contains_key(variable_name) {
            let definition = self
                .registry
                .get_variable_def(variable_name)?
                .clone();
            let raster = decode_raster(&self.mdrs, &definition, self.num_fovs)?;
            debug!(variable_name, shape = ?raster.shape(), "decoded variable raster");
            self.raw.insert(variable_name.to_string(), raster);
        }

        Ok(&self.raw[variable_name])
    }

    /// The physically-scaled raster of a variable: raw values times the
    /// registry scale factor, recomputed from the memoized raw raster. A
    /// scale factor of 1.0 returns the raw values unchanged.
    pub fn get_scaled(&mut self, variable_name: &str) -> ReaderResult<Raster> {
        let scale_factor = self.registry.get_variable_def(variable_name)?.scale_factor;
        let raw = self.get_raw(variable_name)?;

        if scale_factor == 1.0 {
            return Ok(raw.clone());
        }
        Ok(raw.map(|value| value * scale_factor))
    }

    /// Drop all memoized rasters.
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

/// Decode one variable's full raster from the MDR list.
///
/// The byte address of FOV `x` within MDR `y` is
/// `offset + x * stride * element_size`, big-endian per the data type.
fn decode_raster(
    mdrs: &[Mdr],
    definition: &VariableDefinition,
    num_fovs: usize,
) -> ReaderResult<Raster> {
    let data_type = definition.data_type()?;
    let element_size = data_type.element_size();

    let mut raster = Raster::filled(num_fovs, mdrs.len(), 0.0);
    for (y, mdr) in mdrs.iter().enumerate() {
        let payload = mdr.payload();
        for x in 0..num_fovs {
            let value_offset = definition.offset + x * definition.stride * element_size;
            let value = data_type.read_value(payload, value_offset)?;
            raster.set(x, y, value);
        }
    }

    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    fn amsua_cache(num_scan_lines: usize) -> VariableCache {
        let data = Bytes::from(testdata::amsua_product(num_scan_lines));
        let registry = VariableRegistry::load("AMSUA_L1B").unwrap();
        VariableCache::new(data, registry, 30).unwrap()
    }

    #[test]
    fn test_mphr_and_mdrs() {
        let cache = amsua_cache(7);

        assert_eq!(cache.num_scan_lines(), 7);
        assert_eq!(cache.num_fovs(), 30);
        assert!(cache.mphr().product_name().unwrap().starts_with("AMSA_"));
    }

    #[test]
    fn test_get_raw_longitude() {
        let mut cache = amsua_cache(5);

        let longitude = cache.get_raw("longitude").unwrap();
        assert_eq!(longitude.shape(), (5, 30));
        assert_eq!(longitude.get(0, 0), Some(-1680057.0));
        assert_eq!(
            longitude.get(10, 0),
            Some(testdata::amsua_longitude_raw(0, 10) as f64)
        );
        assert_eq!(
            longitude.get(3, 4),
            Some(testdata::amsua_longitude_raw(4, 3) as f64)
        );
    }

    #[test]
    fn test_get_raw_is_memoized() {
        let mut cache = amsua_cache(3);

        let first = cache.get_raw("latitude").unwrap().data().as_ptr();
        let second = cache.get_raw("latitude").unwrap().data().as_ptr();
        assert_eq!(first, second);

        cache.clear();
        let third = cache.get_raw("latitude").unwrap();
        assert_eq!(third.get(0, 0), Some(655792.0));
    }

    #[test]
    fn test_get_scaled_latitude() {
        let mut cache = amsua_cache(4);

        let scaled = cache.get_scaled("latitude").unwrap();
        assert_eq!(scaled.shape(), (4, 30));
        assert!((scaled.get(0, 0).unwrap() - 65.5792).abs() < 1e-8);

        // scaled equals raw times the registry scale factor, cell for cell
        let raw = cache.get_raw("latitude").unwrap().clone();
        for y in 0..4 {
            for x in 0..30 {
                assert_eq!(
                    scaled.get(x, y).unwrap(),
                    raw.get(x, y).unwrap() * 1e-4
                );
            }
        }
    }

    #[test]
    fn test_get_scaled_identity_at_unit_scale() {
        let mut cache = amsua_cache(2);

        let scaled = cache.get_scaled("surface_property").unwrap();
        let raw = cache.get_raw("surface_property").unwrap();
        assert_eq!(&scaled, raw);
        assert_eq!(raw.get(4, 1), Some(1.0));
    }

    #[test]
    fn test_get_raw_radiance_channels() {
        let mut cache = amsua_cache(3);

        let channel_2 = cache.get_raw("SCENE_RADIANCE_02").unwrap();
        assert_eq!(
            channel_2.get(0, 1),
            Some(testdata::amsua_radiance_raw(1, 0, 1) as f64)
        );
        let channel_15 = cache.get_scaled("SCENE_RADIANCE_15").unwrap();
        let expected = testdata::amsua_radiance_raw(2, 5, 14) as f64 * 1e-7;
        assert!((channel_15.get(5, 2).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_variable_is_fatal() {
        let mut cache = amsua_cache(2);

        let err = cache.get_raw("brightness_temperature").unwrap_err();
        assert_eq!(
            err.to_string(),
            "variable not defined: brightness_temperature"
        );
    }

    #[test]
    fn test_missing_mphr_is_fatal() {
        // strip the MPHR by keeping only the MDR part of a product
        let product = testdata::amsua_product(1);
        let mdr_start = product.len() - testdata::AMSUA_MDR_SIZE;
        let data = Bytes::copy_from_slice(&product[mdr_start..]);
        let registry = VariableRegistry::load("AMSUA_L1B").unwrap();

        let result = VariableCache::new(data, registry, 30);
        assert!(matches!(result, Err(ReaderError::MissingMphr)));
    }

    #[test]
    fn test_mhs_shapes() {
        let data = Bytes::from(testdata::mhs_product(4));
        let registry = VariableRegistry::load("MHS_L1B").unwrap();
        let mut cache = VariableCache::new(data, registry, 90).unwrap();

        let latitude = cache.get_raw("latitude").unwrap();
        assert_eq!(latitude.shape(), (4, 90));
        assert_eq!(
            latitude.get(89, 3),
            Some(testdata::mhs_latitude_raw(3, 89) as f64)
        );
    }
}
