//! JSON wire format for [`Delta`](crate::Delta) and [`Op`](crate::Op).
//!
//! Matches the Quill-style Delta JSON shape:
//!
//! ```json
//! {"insert": "hello", "attributes": {"bold": true}}
//! {"insert": {"image": "https://..."}, "attributes": {"width": 200}}
//! {"retain": 5, "attributes": {"italic": null}}
//! {"delete": 3}
//! ```
//!
//! An insert op's `"insert"` field is either a string (text) or a single-key
//! object (the embed's registry key mapped to its value).

use crate::attributes::{AttributeMap, AttributeValue};
use crate::delta::Delta;
use crate::error::Error;
use crate::op::{ObjectValue, Op};
use serde_json::{Map, Value as JsonValue};

impl From<&AttributeValue> for JsonValue {
    fn from(v: &AttributeValue) -> Self {
        match v {
            AttributeValue::String(s) => JsonValue::String(s.clone()),
            AttributeValue::Number(n) => JsonValue::Number((*n).into()),
            AttributeValue::Boolean(b) => JsonValue::Bool(*b),
            AttributeValue::Null => JsonValue::Null,
        }
    }
}

impl TryFrom<&JsonValue> for AttributeValue {
    type Error = Error;

    fn try_from(v: &JsonValue) -> Result<Self, Error> {
        match v {
            JsonValue::String(s) => Ok(AttributeValue::String(s.clone())),
            JsonValue::Bool(b) => Ok(AttributeValue::Boolean(*b)),
            JsonValue::Number(n) => n
                .as_i64()
                .map(AttributeValue::Number)
                .ok_or_else(|| Error::MalformedJson(format!("attribute number out of range: {n}"))),
            JsonValue::Null => Ok(AttributeValue::Null),
            other => Err(Error::MalformedJson(format!(
                "attribute values must be string, number, boolean, or null, got {other}"
            ))),
        }
    }
}

fn attributes_to_json(attrs: &AttributeMap) -> JsonValue {
    let mut map = Map::new();
    for (k, v) in attrs {
        map.insert(k.clone(), v.into());
    }
    JsonValue::Object(map)
}

fn attributes_from_json(value: &JsonValue) -> Result<AttributeMap, Error> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::MalformedJson("\"attributes\" must be an object".to_string()))?;
    let mut attrs = AttributeMap::new();
    for (k, v) in obj {
        attrs.insert(k.clone(), AttributeValue::try_from(v)?);
    }
    Ok(attrs)
}

fn op_to_json(op: &Op) -> JsonValue {
    let mut map = Map::new();
    match op {
        Op::InsertText { text, attributes } => {
            map.insert("insert".to_string(), JsonValue::String(text.clone()));
            if let Some(attrs) = attributes {
                map.insert("attributes".to_string(), attributes_to_json(attrs));
            }
        }
        Op::InsertObject { object, attributes } => {
            let mut inner = Map::new();
            inner.insert(object.key.clone(), object.value.clone());
            map.insert("insert".to_string(), JsonValue::Object(inner));
            if let Some(attrs) = attributes {
                map.insert("attributes".to_string(), attributes_to_json(attrs));
            }
        }
        Op::Retain { length, attributes } => {
            map.insert("retain".to_string(), JsonValue::Number((*length as u64).into()));
            if let Some(attrs) = attributes {
                map.insert("attributes".to_string(), attributes_to_json(attrs));
            }
        }
        Op::Delete(length) => {
            map.insert("delete".to_string(), JsonValue::Number((*length as u64).into()));
        }
    }
    JsonValue::Object(map)
}

fn op_from_json(value: &JsonValue) -> Result<Op, Error> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::MalformedJson("each op must be a JSON object".to_string()))?;

    let attributes = match obj.get("attributes") {
        Some(v) if !v.is_null() => Some(attributes_from_json(v)?),
        _ => None,
    };

    if let Some(insert) = obj.get("insert") {
        return match insert {
            JsonValue::String(text) => Ok(Op::InsertText {
                text: text.clone(),
                attributes,
            }),
            JsonValue::Object(inner) => {
                let mut entries = inner.iter();
                let (key, value) = entries
                    .next()
                    .ok_or_else(|| Error::MalformedJson("embed insert object must have exactly one key".to_string()))?;
                if entries.next().is_some() {
                    return Err(Error::MalformedJson(
                        "embed insert object must have exactly one key".to_string(),
                    ));
                }
                Ok(Op::InsertObject {
                    object: ObjectValue::new(key.clone(), value.clone()),
                    attributes,
                })
            }
            other => Err(Error::MalformedJson(format!(
                "\"insert\" must be a string or single-key object, got {other}"
            ))),
        };
    }

    if let Some(retain) = obj.get("retain") {
        let length = retain
            .as_u64()
            .ok_or_else(|| Error::MalformedJson("\"retain\" must be a non-negative integer".to_string()))?;
        return Ok(Op::Retain {
            length: length as usize,
            attributes,
        });
    }

    if let Some(delete) = obj.get("delete") {
        let length = delete
            .as_u64()
            .ok_or_else(|| Error::MalformedJson("\"delete\" must be a non-negative integer".to_string()))?;
        return Ok(Op::Delete(length as usize));
    }

    Err(Error::MalformedJson(
        "op must have one of \"insert\", \"retain\", \"delete\"".to_string(),
    ))
}

/// Serializes a Delta to its JSON array representation.
pub fn delta_to_json(delta: &Delta) -> JsonValue {
    JsonValue::Array(delta.ops().iter().map(op_to_json).collect())
}

/// Serializes a Delta to a JSON string.
pub fn delta_to_json_string(delta: &Delta) -> Result<String, Error> {
    serde_json::to_string(&delta_to_json(delta))
        .map_err(|e| Error::MalformedJson(e.to_string()))
}

/// Parses a Delta from its JSON array representation.
pub fn delta_from_json(value: &JsonValue) -> Result<Delta, Error> {
    let ops = value
        .as_array()
        .ok_or_else(|| Error::MalformedJson("a Delta must be a JSON array of ops".to_string()))?;

    let mut delta = Delta::new();
    for op in ops {
        delta = delta.push(op_from_json(op)?);
    }
    Ok(delta)
}

/// Parses a Delta from a JSON string.
pub fn delta_from_json_str(s: &str) -> Result<Delta, Error> {
    let value: JsonValue = serde_json::from_str(s).map_err(|e| Error::MalformedJson(e.to_string()))?;
    delta_from_json(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;

    #[test]
    fn text_insert_round_trips() {
        let mut attrs = AttributeMap::new();
        attrs.insert("bold".to_string(), AttributeValue::Boolean(true));
        let delta = Delta::new().insert("hello", Some(attrs));

        let json = delta_to_json_string(&delta).unwrap();
        let parsed = delta_from_json_str(&json).unwrap();
        assert_eq!(delta, parsed);
    }

    #[test]
    fn object_insert_round_trips() {
        let delta = Delta::new().insert_object(
            "image",
            JsonValue::String("https://example.com/x.png".to_string()),
            None,
        );

        let json = delta_to_json(&delta);
        let parsed = delta_from_json(&json).unwrap();
        assert_eq!(delta, parsed);
    }

    #[test]
    fn retain_with_null_attribute_round_trips() {
        let mut attrs = AttributeMap::new();
        attrs.insert("italic".to_string(), AttributeValue::Null);
        let delta = Delta::new().retain(5, Some(attrs));

        let json = delta_to_json(&delta);
        let parsed = delta_from_json(&json).unwrap();
        assert_eq!(delta, parsed);
    }

    #[test]
    fn malformed_insert_object_rejected() {
        let value: JsonValue = serde_json::json!([{"insert": {"a": 1, "b": 2}}]);
        assert!(delta_from_json(&value).is_err());
    }

    #[test]
    fn malformed_op_rejected() {
        let value: JsonValue = serde_json::json!([{"unknown": 1}]);
        assert!(delta_from_json(&value).is_err());
    }

    #[test]
    fn document_json_shape_matches_quill_style() {
        let delta = Delta::new().insert("Title\n", None);
        let json = delta_to_json(&delta);
        assert_eq!(json, serde_json::json!([{"insert": "Title\n"}]));
    }
}
