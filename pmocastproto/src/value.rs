//! Transport-safe encoding of protocol values.
//!
//! Remote sessions exchange JSON, but the bridge needs to round-trip a
//! few shapes JSON has no native spelling for: timestamps, binary
//! buffers, structured errors and structured events. Those are carried
//! as tagged maps (`{"type": "TIMESTAMP", ...}` etc.); everything else
//! maps onto plain JSON. Decoding is lenient: a tagged map that does
//! not parse cleanly degrades to an ordinary [`ProtocolValue::Map`]
//! instead of failing the whole envelope.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Number, Value};

use crate::error::RemoteError;
use crate::event::RemoteEvent;

const TAG_TIMESTAMP: &str = "TIMESTAMP";
const TAG_BUFFER: &str = "BUFFER";
const TAG_ERROR: &str = "ERROR";
const TAG_EVENT: &str = "EVENT";

/// Closed set of value shapes the protocol can carry.
///
/// Live object handles and callables are unrepresentable here by
/// construction; a message field holding one never reaches the codec.
/// Inputs are finite trees (the dispatcher only builds bounded-depth
/// values), so no cycle detection is needed.
#[derive(Clone, Debug, PartialEq)]
pub enum ProtocolValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<ProtocolValue>),
    Map(BTreeMap<String, ProtocolValue>),
    Timestamp(DateTime<Utc>),
    Binary(Vec<u8>),
    Error(RemoteError),
    Event(RemoteEvent),
}

/// Encodes a protocol value into its transport JSON form.
pub fn encode(value: &ProtocolValue) -> Value {
    match value {
        ProtocolValue::Null => Value::Null,
        ProtocolValue::Bool(b) => Value::Bool(*b),
        ProtocolValue::Number(n) => Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ProtocolValue::Text(s) => Value::String(s.clone()),
        ProtocolValue::List(items) => Value::Array(items.iter().map(encode).collect()),
        ProtocolValue::Map(entries) => {
            let mut map = Map::new();
            for (key, entry) in entries {
                map.insert(key.clone(), encode(entry));
            }
            Value::Object(map)
        }
        ProtocolValue::Timestamp(ts) => json!({
            "type": TAG_TIMESTAMP,
            "value": ts.timestamp_millis(),
        }),
        ProtocolValue::Binary(bytes) => json!({
            "type": TAG_BUFFER,
            "data": STANDARD.encode(bytes),
        }),
        ProtocolValue::Error(err) => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String(TAG_ERROR.to_string()));
            if let Value::Object(fields) = serde_json::to_value(err).unwrap_or(Value::Null) {
                map.extend(fields);
            }
            Value::Object(map)
        }
        ProtocolValue::Event(event) => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String(TAG_EVENT.to_string()));
            if let Value::Object(fields) = serde_json::to_value(event).unwrap_or(Value::Null) {
                map.extend(fields);
            }
            Value::Object(map)
        }
    }
}

/// Decodes transport JSON back into a protocol value.
pub fn decode(value: &Value) -> ProtocolValue {
    match value {
        Value::Null => ProtocolValue::Null,
        Value::Bool(b) => ProtocolValue::Bool(*b),
        Value::Number(n) => ProtocolValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => ProtocolValue::Text(s.clone()),
        Value::Array(items) => ProtocolValue::List(items.iter().map(decode).collect()),
        Value::Object(map) => match map.get("type").and_then(Value::as_str) {
            Some(TAG_TIMESTAMP) => decode_timestamp(map).unwrap_or_else(|| decode_plain_map(map)),
            Some(TAG_BUFFER) => decode_buffer(map).unwrap_or_else(|| decode_plain_map(map)),
            Some(TAG_ERROR) => decode_error(map).unwrap_or_else(|| decode_plain_map(map)),
            Some(TAG_EVENT) => decode_event(map).unwrap_or_else(|| decode_plain_map(map)),
            _ => decode_plain_map(map),
        },
    }
}

fn decode_plain_map(map: &Map<String, Value>) -> ProtocolValue {
    let entries = map
        .iter()
        .map(|(key, value)| (key.clone(), decode(value)))
        .collect();
    ProtocolValue::Map(entries)
}

fn decode_timestamp(map: &Map<String, Value>) -> Option<ProtocolValue> {
    let millis = map.get("value")?.as_i64()?;
    let ts = Utc.timestamp_millis_opt(millis).single()?;
    Some(ProtocolValue::Timestamp(ts))
}

fn decode_buffer(map: &Map<String, Value>) -> Option<ProtocolValue> {
    let data = map.get("data")?.as_str()?;
    let bytes = STANDARD.decode(data).ok()?;
    Some(ProtocolValue::Binary(bytes))
}

fn decode_error(map: &Map<String, Value>) -> Option<ProtocolValue> {
    let mut fields = map.clone();
    fields.remove("type");
    let err: RemoteError = serde_json::from_value(Value::Object(fields)).ok()?;
    Some(ProtocolValue::Error(err))
}

fn decode_event(map: &Map<String, Value>) -> Option<ProtocolValue> {
    let mut fields = map.clone();
    fields.remove("type");
    let event: RemoteEvent = serde_json::from_value(Value::Object(fields)).ok()?;
    Some(ProtocolValue::Event(event))
}
