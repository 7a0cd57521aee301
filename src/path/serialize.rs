//! JSON-compatible serialization for path specifications (spec.md §6.2).
//!
//! ```text
//! { "type": "<indicator>", "<attr>": <value>, ..., "parent": <nested|null> }
//! ```
//!
//! Byte-valued attributes are hex-encoded. Round-trip guarantee:
//! `parse(serialize(ps)).comparable() == ps.comparable()`.

use serde_json::{Map, Value};

use super::factory::Factory;
use super::spec::{AttributeValue, PathSpec};
use crate::definitions::TypeIndicator;
use crate::error::PathSpecError;

/// Serializes a path spec to its JSON-compatible nested-object form.
pub fn serialize(path_spec: &PathSpec) -> Value {
    let mut object = Map::new();
    object.insert("type".to_string(), Value::String(path_spec.type_indicator().as_str().to_string()));

    for name in attribute_names(path_spec) {
        if let Some(value) = path_spec.attribute(name) {
            object.insert(name.to_string(), attribute_to_json(value));
        }
    }

    let parent = match path_spec.get_parent() {
        Some(parent) => serialize(parent),
        None => Value::Null,
    };
    object.insert("parent".to_string(), parent);

    Value::Object(object)
}

fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Str(s) => Value::String(s.clone()),
        AttributeValue::Int(n) => Value::Number((*n).into()),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Bytes(b) => {
            Value::String(b.iter().map(|byte| format!("{byte:02x}")).collect())
        }
    }
}

/// Every attribute name used across `spec.rs`'s per-type allow-lists.
/// Serialization writes whichever of these are present on a node;
/// deserialization probes for all of them. New attribute names added to
/// `spec.rs` must be added here too.
const KNOWN_ATTRIBUTE_NAMES: &[&str] = &[
    "location",
    "inode",
    "identifier",
    "volume_index",
    "entry_index",
    "start_offset",
    "range_offset",
    "range_size",
    "compression_method",
    "encryption_method",
    "encoding_method",
    "row_index",
    "data_stream",
    "table_name",
    "column_name",
    "row_condition",
];

fn attribute_names(_path_spec: &PathSpec) -> &'static [&'static str] {
    KNOWN_ATTRIBUTE_NAMES
}

/// Parses a path spec from its JSON-compatible form, validating each
/// node's type indicator against `factory` as it goes.
pub fn parse(factory: &Factory, value: &Value) -> Result<PathSpec, PathSpecError> {
    let object = value
        .as_object()
        .ok_or_else(|| PathSpecError::Malformed("expected a JSON object".to_string()))?;

    let type_name = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| PathSpecError::Malformed("missing \"type\"".to_string()))?;
    let type_indicator = TypeIndicator::from_str(type_name)
        .ok_or_else(|| PathSpecError::Malformed(format!("unknown type indicator {type_name:?}")))?;

    if !factory.is_registered(type_indicator) {
        return Err(PathSpecError::Malformed(format!(
            "type indicator {type_name} is not registered with the factory"
        )));
    }

    let parent = match object.get("parent") {
        Some(Value::Null) | None => None,
        Some(nested) => Some(parse(factory, nested)?),
    };

    let mut attributes = Vec::new();
    for name in KNOWN_ATTRIBUTE_NAMES {
        if let Some(json_value) = object.get(*name) {
            attributes.push((*name, json_to_attribute(json_value)?));
        }
    }

    PathSpec::new(type_indicator, parent, attributes)
}

fn json_to_attribute(value: &Value) -> Result<AttributeValue, PathSpecError> {
    Ok(match value {
        Value::String(s) => AttributeValue::Str(s.clone()),
        Value::Number(n) => AttributeValue::Int(
            n.as_i64().ok_or_else(|| PathSpecError::Malformed(format!("bad integer {n}")))?,
        ),
        Value::Bool(b) => AttributeValue::Bool(*b),
        other => return Err(PathSpecError::Malformed(format!("unsupported attribute value {other}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::TypeIndicator::*;

    #[test]
    fn round_trips_through_comparable() {
        let factory = Factory::with_defaults();
        let os = PathSpec::new(Os, None, [("location", "/image.raw".into())]).unwrap();
        let tar = PathSpec::new(Tar, Some(os), [("location", "/syslog".into())]).unwrap();

        let json = serialize(&tar);
        let parsed = parse(&factory, &json).unwrap();
        assert_eq!(parsed.comparable(), tar.comparable());
    }

    #[test]
    fn unregistered_type_is_rejected() {
        let factory = Factory::new();
        let os = PathSpec::new(Os, None, [("location", "/image.raw".into())]).unwrap();
        let json = serialize(&os);
        assert!(parse(&factory, &json).is_err());
    }
}
