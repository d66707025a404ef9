//! CF attribute derivation.
//!
//! The metadata exporter writes CF-convention attributes for every exposed
//! variable; all of them derive directly from the registry definition.

use crate::error::{ReaderError, ReaderResult};
use crate::registry::VariableDefinition;

/// A CF attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    NumberList(Vec<f64>),
}

/// A named CF attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct CfAttribute {
    pub name: &'static str,
    pub value: AttributeValue,
}

impl CfAttribute {
    fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: AttributeValue::Text(value.into()),
        }
    }

    fn number(name: &'static str, value: f64) -> Self {
        Self {
            name,
            value: AttributeValue::Number(value),
        }
    }
}

/// Derive the CF attributes of a variable definition.
///
/// `units` and `standard_name` are emitted when present; `scale_factor` and
/// a zero `add_offset` only when the scale factor is not 1.0; `_FillValue`
/// always, from the data type's sentinel; `flag_meanings`/`flag_values`
/// only when both are present.
pub fn cf_attributes(definition: &VariableDefinition) -> ReaderResult<Vec<CfAttribute>> {
    let mut attributes = Vec::new();

    if let Some(units) = non_empty(&definition.units) {
        attributes.push(CfAttribute::text("units", units));
    }

    if definition.scale_factor != 1.0 {
        attributes.push(CfAttribute::number("scale_factor", definition.scale_factor));
        attributes.push(CfAttribute::number("add_offset", 0.0));
    }

    attributes.push(CfAttribute::number(
        "_FillValue",
        definition.data_type()?.fill_value(),
    ));

    if let (Some(meanings), Some(values)) = (
        non_empty(&definition.flag_meanings),
        non_empty(&definition.flag_values),
    ) {
        attributes.push(CfAttribute::text("flag_meanings", meanings));
        attributes.push(CfAttribute {
            name: "flag_values",
            value: AttributeValue::NumberList(parse_flag_values(definition, values)?),
        });
    }

    if let Some(standard_name) = non_empty(&definition.standard_name) {
        attributes.push(CfAttribute::text("standard_name", standard_name));
    }

    Ok(attributes)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_flag_values(definition: &VariableDefinition, values: &str) -> ReaderResult<Vec<f64>> {
    values
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| ReaderError::InvalidFlagValues {
            name: definition
                .standard_name
                .clone()
                .unwrap_or_else(|| definition.data_type.clone()),
            values: values.to_string(),
        })
}
