//! Declarative variable registry.
//!
//! Each sensor ships a packaged `{resource_key}/variables.json` schema: an
//! object keyed by variable name whose entries describe where the field
//! lives inside an MDR and how to turn its raw integers into physical
//! values. Adding a field for a sensor means editing its schema, never the
//! decode code.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use eps_parser::EpsDataType;

use crate::error::{ReaderError, ReaderResult};

/// Byte step between the per-channel definitions a wildcard key expands to.
const CHANNEL_BYTE_WIDTH: usize = 4;

/// Where one physical variable lives inside an MDR and how to scale it.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableDefinition {
    /// One of the nine EPS data type spellings, e.g. `integer4`.
    pub data_type: String,
    /// Bytes from the start of the MDR record to FOV 0's value.
    pub offset: usize,
    /// FOV-to-FOV step in elements.
    pub stride: usize,
    /// Multiplier from raw integers to physical units; 1.0 means unscaled.
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub flag_meanings: Option<String>,
    #[serde(default)]
    pub flag_values: Option<String>,
    #[serde(default)]
    pub standard_name: Option<String>,
}

fn default_scale_factor() -> f64 {
    1.0
}

impl VariableDefinition {
    /// Resolve the schema data type spelling. An unknown spelling is a fatal
    /// schema error, distinct from any data condition.
    pub fn data_type(&self) -> ReaderResult<EpsDataType> {
        Ok(EpsDataType::from_str(&self.data_type)?)
    }
}

/// Immutable name → definition map for one sensor.
///
/// Loaded once per reader open and threaded as a value; definitions never
/// change after load, so shared read-only use across readers is safe.
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    variables: BTreeMap<String, VariableDefinition>,
}

impl VariableRegistry {
    /// Load the packaged schema for a sensor resource key.
    pub fn load(resource_key: &str) -> ReaderResult<Self> {
        let path = format!("{resource_key}/variables.json");
        let schema =
            packaged_schema(resource_key).ok_or_else(|| ReaderError::SchemaNotFound(path.clone()))?;

        let variables: BTreeMap<String, VariableDefinition> = serde_json::from_str(schema)
            .map_err(|err| ReaderError::InvalidSchema {
                path,
                message: err.to_string(),
            })?;

        let variables = expand_channel_wildcards(variables);
        debug!(resource_key, variables = variables.len(), "loaded variable registry");

        Ok(Self { variables })
    }

    /// Look up a variable definition; an unknown name is a caller error.
    pub fn get_variable_def(&self, name: &str) -> ReaderResult<&VariableDefinition> {
        self.variables
            .get(name)
            .ok_or_else(|| ReaderError::VariableNotDefined(name.to_string()))
    }

    /// All definitions, ordered by name.
    pub fn variables(&self) -> &BTreeMap<String, VariableDefinition> {
        &self.variables
    }
}

fn packaged_schema(resource_key: &str) -> Option<&'static str> {
    match resource_key {
        "AMSUA_L1B" => Some(include_str!("../resources/AMSUA_L1B/variables.json")),
        "MHS_L1B" => Some(include_str!("../resources/MHS_L1B/variables.json")),
        _ => None,
    }
}

/// Expand wildcard channel keys into per-channel definitions.
///
/// A key containing `*` declares a block of `stride` interleaved channels;
/// it expands into one definition per channel, named with a 1-based `%02d`
/// channel number and offset by the channel's position within the block. The
/// wildcard key itself is removed.
fn expand_channel_wildcards(
    variables: BTreeMap<String, VariableDefinition>,
) -> BTreeMap<String, VariableDefinition> {
    let mut expanded = BTreeMap::new();

    for (key, definition) in variables {
        if !key.contains('*') {
            expanded.insert(key, definition);
            continue;
        }

        for channel in 0..definition.stride {
            let mut channel_def = definition.clone();
            channel_def.offset = definition.offset + CHANNEL_BYTE_WIDTH * channel;
            let channel_key = key.replace('*', &format!("{:02}", channel + 1));
            expanded.insert(channel_key, channel_def);
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_amsua() {
        let registry = VariableRegistry::load("AMSUA_L1B").unwrap();

        let latitude = registry.get_variable_def("latitude").unwrap();
        assert_eq!(latitude.data_type().unwrap(), EpsDataType::Integer4);
        assert_eq!(latitude.offset, 2082);
        assert_eq!(latitude.stride, 2);
        assert_eq!(latitude.scale_factor, 1e-4);
        assert_eq!(latitude.units.as_deref(), Some("degrees_north"));
        assert_eq!(latitude.standard_name.as_deref(), Some("latitude"));

        let longitude = registry.get_variable_def("longitude").unwrap();
        assert_eq!(longitude.offset, 2086);
    }

    #[test]
    fn test_load_mhs() {
        let registry = VariableRegistry::load("MHS_L1B").unwrap();

        let latitude = registry.get_variable_def("latitude").unwrap();
        assert_eq!(latitude.offset, 3318);
        let longitude = registry.get_variable_def("longitude").unwrap();
        assert_eq!(longitude.offset, 3322);
        assert_eq!(longitude.scale_factor, 1e-4);
    }

    #[test]
    fn test_load_unknown_key() {
        let err = VariableRegistry::load("unknown-key").unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema resource not found: unknown-key/variables.json"
        );
    }

    #[test]
    fn test_wildcard_expansion() {
        let registry = VariableRegistry::load("AMSUA_L1B").unwrap();

        assert!(registry.get_variable_def("SCENE_RADIANCE_*").is_err());

        let first = registry.get_variable_def("SCENE_RADIANCE_01").unwrap();
        assert_eq!(first.offset, 42);
        assert_eq!(first.stride, 15);
        assert_eq!(first.scale_factor, 1e-7);

        let seventh = registry.get_variable_def("SCENE_RADIANCE_07").unwrap();
        assert_eq!(seventh.offset, 42 + 4 * 6);

        let last = registry.get_variable_def("SCENE_RADIANCE_15").unwrap();
        assert_eq!(last.offset, 42 + 4 * 14);
        assert!(registry.get_variable_def("SCENE_RADIANCE_16").is_err());
    }

    #[test]
    fn test_default_scale_factor() {
        let registry = VariableRegistry::load("AMSUA_L1B").unwrap();
        let surface = registry.get_variable_def("surface_property").unwrap();
        assert_eq!(surface.scale_factor, 1.0);
        assert_eq!(surface.flag_values.as_deref(), Some("0, 1, 2"));
    }

    #[test]
    fn test_unknown_variable() {
        let registry = VariableRegistry::load("MHS_L1B").unwrap();
        let err = registry.get_variable_def("brightness").unwrap_err();
        assert_eq!(err.to_string(), "variable not defined: brightness");
    }
}
