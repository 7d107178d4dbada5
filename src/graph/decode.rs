//! Envelope decoding.
//!
//! Stores hand back generic, self-describing [`Envelope`]s. This module turns
//! them into typed values:
//!
//! - [`decode_scalar`]: integer, float, text or null
//! - [`decode_array`]: ordered list of integer ids
//! - [`decode_vertex`]: a [`Vertex`] with id, label and properties
//! - [`decode_value`]: the full tagged [`Value`]
//!
//! Text envelopes may carry a trailing type tag (`{...}::vertex`,
//! `[1, 2]::_agtype`, `12.5::numeric`) which is stripped before parsing. When
//! the body is not valid JSON, the first complete JSON value at its start is
//! used instead; if there is none, decoding fails with a [`DecodeError`]. No
//! decoder ever substitutes a default for malformed input.

use crate::neo4j::models::{id_property_for, Envelope};
use serde_json::{Map, Value as JsonValue};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Maximum number of characters of raw input kept in a [`DecodeError`].
pub const RAW_PREVIEW_CHARS: usize = 200;

// ============================================================================
// Types
// ============================================================================

/// A store value that could not be decoded.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("decode error: {message} (raw: {raw})")]
pub struct DecodeError {
    /// Parser or type-mismatch message
    pub message: String,
    /// The offending input, truncated to [`RAW_PREVIEW_CHARS`] characters
    pub raw: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>, raw: &str) -> Self {
        Self {
            message: message.into(),
            raw: raw.chars().take(RAW_PREVIEW_CHARS).collect(),
        }
    }
}

/// A decoded vertex record.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Store-level identifier, when the envelope carried one
    pub id: Option<i64>,
    /// Vertex label, empty when unknown
    pub label: String,
    pub properties: Map<String, JsonValue>,
}

/// Fully decoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Vertex(Vertex),
    Null,
}

impl Value {
    /// Short type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Vertex(_) => "vertex",
            Value::Null => "null",
        }
    }
}

// ============================================================================
// Vertex accessors
// ============================================================================

impl Vertex {
    fn describe(&self) -> &str {
        if self.label.is_empty() {
            "vertex"
        } else {
            &self.label
        }
    }

    fn property(&self, key: &str) -> Result<&JsonValue, DecodeError> {
        match self.properties.get(key) {
            Some(JsonValue::Null) | None => Err(self.error(format!(
                "missing property `{}` on {}",
                key,
                self.describe()
            ))),
            Some(value) => Ok(value),
        }
    }

    fn error(&self, message: String) -> DecodeError {
        DecodeError::new(message, &JsonValue::Object(self.properties.clone()).to_string())
    }

    /// Integer property. Numeric strings are accepted.
    pub fn int(&self, key: &str) -> Result<i64, DecodeError> {
        let value = self.property(key)?;
        json_to_int(value).ok_or_else(|| {
            self.error(format!(
                "property `{}` on {} is not an integer",
                key,
                self.describe()
            ))
        })
    }

    /// Float property. Integers are widened.
    pub fn float(&self, key: &str) -> Result<f64, DecodeError> {
        let value = self.property(key)?;
        let parsed = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| {
            self.error(format!(
                "property `{}` on {} is not a number",
                key,
                self.describe()
            ))
        })
    }

    /// Text property.
    pub fn text(&self, key: &str) -> Result<String, DecodeError> {
        match self.property(key)? {
            JsonValue::String(s) => Ok(s.clone()),
            _ => Err(self.error(format!(
                "property `{}` on {} is not text",
                key,
                self.describe()
            ))),
        }
    }

    /// Optional text property; missing and null both yield `None`.
    pub fn opt_text(&self, key: &str) -> Result<Option<String>, DecodeError> {
        match self.properties.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.error(format!(
                "property `{}` on {} is not text",
                key,
                self.describe()
            ))),
        }
    }
}

// ============================================================================
// Public decoders
// ============================================================================

/// Decode a scalar envelope.
pub fn decode_scalar(envelope: &Envelope) -> Result<Value, DecodeError> {
    let json = envelope_to_json(envelope)?;
    match json.as_ref() {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Number(n) => Ok(number_value(n)),
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Bool(_) => Err(DecodeError::new(
            "expected a scalar, got a boolean",
            &raw_of(envelope),
        )),
        JsonValue::Array(_) => Err(DecodeError::new(
            "expected a scalar, got a list",
            &raw_of(envelope),
        )),
        JsonValue::Object(_) => Err(DecodeError::new(
            "expected a scalar, got a mapping",
            &raw_of(envelope),
        )),
    }
}

/// Decode an array of integer ids.
///
/// Null, empty text and `[]` decode to an empty list. Null items are skipped;
/// numeric strings are accepted. Order is preserved and duplicates are kept.
pub fn decode_array(envelope: &Envelope) -> Result<Vec<i64>, DecodeError> {
    let json = envelope_to_json(envelope)?;
    let items = match json.as_ref() {
        JsonValue::Null => return Ok(Vec::new()),
        JsonValue::Array(items) => items,
        other => {
            return Err(DecodeError::new(
                format!("expected an array, got {}", json_kind(other)),
                &raw_of(envelope),
            ))
        }
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        if item.is_null() {
            continue;
        }
        match json_to_int(item) {
            Some(id) => ids.push(id),
            None => {
                return Err(DecodeError::new(
                    format!("array item {} is not an integer", item),
                    &raw_of(envelope),
                ))
            }
        }
    }
    Ok(ids)
}

/// Decode a vertex envelope.
pub fn decode_vertex(envelope: &Envelope) -> Result<Vertex, DecodeError> {
    let json = envelope_to_json(envelope)?;
    match json.as_ref() {
        JsonValue::Object(map) => vertex_from_map(map, envelope),
        other => Err(DecodeError::new(
            format!("expected a vertex, got {}", json_kind(other)),
            &raw_of(envelope),
        )),
    }
}

/// Decode a vertex envelope that may be null (e.g. an optional match).
pub fn decode_optional_vertex(envelope: &Envelope) -> Result<Option<Vertex>, DecodeError> {
    let json = envelope_to_json(envelope)?;
    match json.as_ref() {
        JsonValue::Null => Ok(None),
        JsonValue::Object(map) => vertex_from_map(map, envelope).map(Some),
        other => Err(DecodeError::new(
            format!("expected a vertex or null, got {}", json_kind(other)),
            &raw_of(envelope),
        )),
    }
}

/// Decode any envelope into the full tagged [`Value`].
pub fn decode_value(envelope: &Envelope) -> Result<Value, DecodeError> {
    let json = envelope_to_json(envelope)?;
    json_to_value(json.as_ref(), envelope)
}

// ============================================================================
// Envelope → JSON
// ============================================================================

/// Strip a trailing `::tag` when the tag is identifier-shaped.
///
/// `"a::b"` (a quoted string containing `::`) is left alone because `b"` is
/// not an identifier.
pub fn strip_type_tag(text: &str) -> &str {
    let trimmed = text.trim_end();
    if let Some(idx) = trimmed.rfind("::") {
        let tag = &trimmed[idx + 2..];
        let mut chars = tag.chars();
        let identifier = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if identifier {
            return trimmed[..idx].trim_end();
        }
    }
    trimmed
}

fn envelope_to_json(envelope: &Envelope) -> Result<Cow<'_, JsonValue>, DecodeError> {
    match envelope {
        Envelope::Native(value) => Ok(Cow::Borrowed(value)),
        Envelope::Text(text) => parse_text(text).map(Cow::Owned),
        Envelope::Bytes(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                DecodeError::new(
                    format!("invalid UTF-8: {}", e),
                    &String::from_utf8_lossy(bytes),
                )
            })?;
            parse_text(text).map(Cow::Owned)
        }
    }
}

fn parse_text(text: &str) -> Result<JsonValue, DecodeError> {
    let body = strip_type_tag(text.trim());
    if body.is_empty() {
        return Ok(JsonValue::Null);
    }

    match serde_json::from_str::<JsonValue>(body) {
        Ok(value) => Ok(value),
        Err(err) => {
            // Fall back to the first complete value at the start of the input.
            let mut stream = serde_json::Deserializer::from_str(body).into_iter::<JsonValue>();
            match stream.next() {
                Some(Ok(value)) => {
                    tracing::debug!(
                        "Decoded leading value from malformed envelope ({}): {}",
                        err,
                        preview(text)
                    );
                    Ok(value)
                }
                _ => Err(DecodeError::new(err.to_string(), text)),
            }
        }
    }
}

// ============================================================================
// JSON → typed values
// ============================================================================

fn vertex_from_map(map: &Map<String, JsonValue>, envelope: &Envelope) -> Result<Vertex, DecodeError> {
    let wrapped = map.contains_key("properties") || map.contains_key("label");

    let (label, mut properties) = if wrapped {
        let label = match map.get("label") {
            None | Some(JsonValue::Null) => String::new(),
            Some(JsonValue::String(s)) => s.clone(),
            Some(other) => {
                return Err(DecodeError::new(
                    format!("vertex label is not text: {}", other),
                    &raw_of(envelope),
                ))
            }
        };
        let properties = match map.get("properties") {
            None | Some(JsonValue::Null) => Map::new(),
            Some(JsonValue::Object(props)) => props.clone(),
            Some(other) => {
                return Err(DecodeError::new(
                    format!("vertex properties are not a mapping: {}", json_kind(other)),
                    &raw_of(envelope),
                ))
            }
        };
        (label, properties)
    } else {
        (String::new(), map.clone())
    };

    let id = map.get("id").and_then(json_to_int);

    if let (Some(key), Some(id)) = (id_property_for(&label), id) {
        let missing = properties.get(key).map_or(true, JsonValue::is_null);
        if missing {
            properties.insert(key.to_string(), JsonValue::from(id));
        }
    }

    Ok(Vertex {
        id,
        label,
        properties,
    })
}

fn json_to_value(json: &JsonValue, envelope: &Envelope) -> Result<Value, DecodeError> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Number(n) => Ok(number_value(n)),
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| json_to_value(item, envelope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        JsonValue::Object(map) => vertex_from_map(map, envelope).map(Value::Vertex),
        JsonValue::Bool(_) => Err(DecodeError::new(
            "booleans are not a graph value",
            &raw_of(envelope),
        )),
    }
}

fn number_value(n: &serde_json::Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Integer(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn json_to_int(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "text",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "a mapping",
    }
}

fn raw_of(envelope: &Envelope) -> String {
    match envelope {
        Envelope::Text(text) => text.clone(),
        Envelope::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Envelope::Native(value) => value.to_string(),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(RAW_PREVIEW_CHARS).collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::List(items) => write!(f, "list of {}", items.len()),
            Value::Vertex(v) => write!(f, "{} vertex", v.describe()),
            Value::Null => write!(f, "null"),
        }
    }
}
