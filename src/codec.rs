use crate::any_value::AnyValue;
use crate::error::{CodableError, CodableResult};
use crate::tag::ValueTag;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{self, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::str::FromStr;
use url::Url;

const TYPE_KEY: &str = "type";
const VALUE_KEY: &str = "value";

// RFC 3339 only has room for four-digit years
const MIN_DATE_YEAR: i32 = 0;
const MAX_DATE_YEAR: i32 = 9999;

impl AnyValue {
    /// Encodes the value as a `{"type": ..., "value": ...}` document
    ///
    /// Arrays, dictionaries and pairs encode every child the same way, so
    /// the document is self-describing all the way down. A pair is written
    /// as a two-element `Array`.
    ///
    /// # Errors
    ///
    /// - Returns `CodableError::UnsupportedType` if this value, or any value
    ///   nested inside it, is [`AnyValue::Unsupported`]
    /// - Returns `CodableError::NonFiniteFloat` for NaN or infinite floats
    /// - Returns `CodableError::DateOutOfRange` for timestamps outside the
    ///   years 0000 to 9999
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_anycodable::AnyValue;
    /// use serde_json::json;
    ///
    /// let document = AnyValue::new(true).encode()?;
    /// assert_eq!(document, json!({"type": "Bool", "value": true}));
    /// # Ok::<(), sovran_anycodable::CodableError>(())
    /// ```
    pub fn encode(&self) -> CodableResult<Value> {
        encode_at(self, "$")
    }

    /// Decodes a document produced by [`AnyValue::encode`]
    ///
    /// The `type` field is read first and decides how `value` is
    /// interpreted. A `Tuple` document decodes into [`AnyValue::Pair`].
    ///
    /// # Errors
    ///
    /// - Returns `CodableError::MalformedDocument` if a node is not an object
    ///   with a string `type` and a `value`
    /// - Returns `CodableError::UnrecognizedTag` if `type` names no variant
    /// - Returns `CodableError::MalformedPayload` if `value` doesn't have the
    ///   shape the tag requires
    pub fn decode(document: &Value) -> CodableResult<AnyValue> {
        decode_at(document, "$")
    }

    /// Encodes the value and prints the document as compact JSON text
    ///
    /// # Errors
    ///
    /// Same as [`AnyValue::encode`].
    pub fn to_json_string(&self) -> CodableResult<String> {
        Ok(serde_json::to_string(&self.encode()?)?)
    }

    /// Parses JSON text and decodes it
    ///
    /// # Errors
    ///
    /// Returns `CodableError::Json` if the text isn't valid JSON, otherwise
    /// the same errors as [`AnyValue::decode`].
    pub fn from_json_str(text: &str) -> CodableResult<AnyValue> {
        let document: Value = serde_json::from_str(text)?;
        AnyValue::decode(&document)
    }
}

impl Serialize for AnyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode()
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = Value::deserialize(deserializer)?;
        AnyValue::decode(&document).map_err(de::Error::custom)
    }
}

fn envelope(tag: ValueTag, value: Value) -> Value {
    let mut document = Map::with_capacity(2);
    document.insert(TYPE_KEY.to_string(), Value::String(tag.as_str().to_string()));
    document.insert(VALUE_KEY.to_string(), value);
    Value::Object(document)
}

fn encode_at(value: &AnyValue, path: &str) -> CodableResult<Value> {
    let (tag, payload) = match value {
        AnyValue::String(v) => (ValueTag::String, Value::String(v.clone())),
        AnyValue::UInt(v) => (ValueTag::UInt, Value::from(*v)),
        AnyValue::UInt8(v) => (ValueTag::UInt8, Value::from(*v)),
        AnyValue::UInt16(v) => (ValueTag::UInt16, Value::from(*v)),
        AnyValue::UInt32(v) => (ValueTag::UInt32, Value::from(*v)),
        AnyValue::UInt64(v) => (ValueTag::UInt64, Value::from(*v)),
        AnyValue::Int(v) => (ValueTag::Int, Value::from(*v)),
        AnyValue::Int8(v) => (ValueTag::Int8, Value::from(*v)),
        AnyValue::Int16(v) => (ValueTag::Int16, Value::from(*v)),
        AnyValue::Int32(v) => (ValueTag::Int32, Value::from(*v)),
        AnyValue::Int64(v) => (ValueTag::Int64, Value::from(*v)),
        AnyValue::Float32(v) => (ValueTag::Float, encode_float(f64::from(*v), path)?),
        AnyValue::Float64(v) => (ValueTag::Double, encode_float(*v, path)?),
        AnyValue::Bool(v) => (ValueTag::Bool, Value::Bool(*v)),
        AnyValue::Array(items) => (ValueTag::Array, encode_items(items.iter(), path)?),
        AnyValue::Map(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, entry) in entries {
                object.insert(key.clone(), encode_at(entry, &key_path(path, key))?);
            }
            (ValueTag::Dictionary, Value::Object(object))
        }
        AnyValue::Pair(pair) => (ValueTag::Array, encode_items([&pair.0, &pair.1], path)?),
        AnyValue::Bytes(v) => (ValueTag::Data, Value::String(STANDARD.encode(v))),
        AnyValue::Timestamp(v) => {
            if !(MIN_DATE_YEAR..=MAX_DATE_YEAR).contains(&v.year()) {
                return Err(CodableError::DateOutOfRange {
                    year: v.year(),
                    path: path.to_string(),
                });
            }
            (
                ValueTag::Date,
                Value::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            )
        }
        AnyValue::Url(v) => (ValueTag::URL, Value::String(v.as_str().to_string())),
        AnyValue::Decimal(v) => (ValueTag::Decimal, Value::String(v.to_string())),
        AnyValue::Unsupported(v) => {
            return Err(CodableError::UnsupportedType {
                type_name: v.type_name(),
                path: path.to_string(),
            })
        }
    };
    Ok(envelope(tag, payload))
}

fn encode_items<'a>(
    items: impl IntoIterator<Item = &'a AnyValue>,
    path: &str,
) -> CodableResult<Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| encode_at(item, &format!("{path}[{index}]")))
        .collect::<CodableResult<Vec<_>>>()
        .map(Value::Array)
}

// Plain identifiers extend the path with `.key`; anything else is quoted so a
// key like `a.b` can't be mistaken for nesting.
fn key_path(path: &str, key: &str) -> String {
    let plain = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{path}.{key}")
    } else {
        format!("{path}[{}]", Value::String(key.to_string()))
    }
}

fn encode_float(value: f64, path: &str) -> CodableResult<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| CodableError::NonFiniteFloat {
            path: path.to_string(),
        })
}

fn decode_at(document: &Value, path: &str) -> CodableResult<AnyValue> {
    let object = document.as_object().ok_or_else(|| {
        CodableError::malformed_document(path, format!("expected an object, found {}", kind(document)))
    })?;

    let tag_name = match object.get(TYPE_KEY) {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(CodableError::malformed_document(
                path,
                format!("`type` must be a string, found {}", kind(other)),
            ))
        }
        None => return Err(CodableError::malformed_document(path, "missing `type` field")),
    };
    let tag = ValueTag::from_str(tag_name).map_err(|_| CodableError::UnrecognizedTag {
        tag: tag_name.clone(),
        path: path.to_string(),
    })?;

    let payload = object
        .get(VALUE_KEY)
        .ok_or_else(|| CodableError::malformed_document(path, "missing `value` field"))?;

    decode_payload(tag, payload, path)
}

fn decode_payload(tag: ValueTag, payload: &Value, path: &str) -> CodableResult<AnyValue> {
    let value = match tag {
        ValueTag::String => AnyValue::String(expect_str(tag, payload, path)?.to_string()),
        ValueTag::UInt => AnyValue::UInt(decode_unsigned(tag, payload, path)?),
        ValueTag::UInt8 => AnyValue::UInt8(decode_unsigned(tag, payload, path)?),
        ValueTag::UInt16 => AnyValue::UInt16(decode_unsigned(tag, payload, path)?),
        ValueTag::UInt32 => AnyValue::UInt32(decode_unsigned(tag, payload, path)?),
        ValueTag::UInt64 => AnyValue::UInt64(decode_unsigned(tag, payload, path)?),
        ValueTag::Int => AnyValue::Int(decode_signed(tag, payload, path)?),
        ValueTag::Int8 => AnyValue::Int8(decode_signed(tag, payload, path)?),
        ValueTag::Int16 => AnyValue::Int16(decode_signed(tag, payload, path)?),
        ValueTag::Int32 => AnyValue::Int32(decode_signed(tag, payload, path)?),
        ValueTag::Int64 => AnyValue::Int64(decode_signed(tag, payload, path)?),
        ValueTag::Float => {
            let wide = expect_f64(tag, payload, path)?;
            #[allow(clippy::cast_possible_truncation)]
            let narrow = wide as f32;
            if !narrow.is_finite() {
                return Err(CodableError::malformed_payload(
                    tag.as_str(),
                    path,
                    format!("{wide} is out of range"),
                ));
            }
            AnyValue::Float32(narrow)
        }
        ValueTag::Double => AnyValue::Float64(expect_f64(tag, payload, path)?),
        ValueTag::Bool => AnyValue::Bool(
            payload
                .as_bool()
                .ok_or_else(|| unexpected(tag, "a boolean", payload, path))?,
        ),
        ValueTag::Array => {
            let items = expect_array(tag, payload, path)?;
            AnyValue::Array(decode_items(items, path)?)
        }
        ValueTag::Dictionary => {
            let object = payload
                .as_object()
                .ok_or_else(|| unexpected(tag, "an object", payload, path))?;
            let entries = object
                .iter()
                .map(|(key, entry)| {
                    decode_at(entry, &key_path(path, key)).map(|value| (key.clone(), value))
                })
                .collect::<CodableResult<HashMap<_, _>>>()?;
            AnyValue::Map(entries)
        }
        ValueTag::Tuple => {
            let items = expect_array(tag, payload, path)?;
            let [first, second]: [AnyValue; 2] =
                decode_items(items, path)?.try_into().map_err(|found: Vec<AnyValue>| {
                    CodableError::malformed_payload(
                        tag.as_str(),
                        path,
                        format!("expected exactly 2 elements, found {}", found.len()),
                    )
                })?;
            AnyValue::from((first, second))
        }
        ValueTag::Data => {
            let encoded = expect_str(tag, payload, path)?;
            let bytes = STANDARD.decode(encoded).map_err(|e| {
                CodableError::malformed_payload(tag.as_str(), path, format!("invalid base64: {e}"))
            })?;
            AnyValue::Bytes(bytes)
        }
        ValueTag::Date => {
            let text = expect_str(tag, payload, path)?;
            let instant = DateTime::parse_from_rfc3339(text).map_err(|e| {
                CodableError::malformed_payload(tag.as_str(), path, format!("invalid RFC 3339 date: {e}"))
            })?;
            let instant = instant.with_timezone(&Utc);
            if !(MIN_DATE_YEAR..=MAX_DATE_YEAR).contains(&instant.year()) {
                return Err(CodableError::malformed_payload(
                    tag.as_str(),
                    path,
                    format!("year {} is outside 0000-9999 once in UTC", instant.year()),
                ));
            }
            AnyValue::Timestamp(instant)
        }
        ValueTag::URL => {
            let text = expect_str(tag, payload, path)?;
            let url = Url::parse(text).map_err(|e| {
                CodableError::malformed_payload(tag.as_str(), path, format!("invalid URL: {e}"))
            })?;
            AnyValue::Url(url)
        }
        ValueTag::Decimal => AnyValue::Decimal(decode_decimal(tag, payload, path)?),
        ValueTag::Unsupported => {
            return Err(CodableError::UnrecognizedTag {
                tag: tag.as_str().to_string(),
                path: path.to_string(),
            })
        }
    };
    Ok(value)
}

fn decode_items(items: &[Value], path: &str) -> CodableResult<Vec<AnyValue>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_at(item, &format!("{path}[{index}]")))
        .collect()
}

fn decode_unsigned<T: TryFrom<u64>>(tag: ValueTag, payload: &Value, path: &str) -> CodableResult<T> {
    let raw = payload
        .as_u64()
        .ok_or_else(|| unexpected(tag, "an unsigned integer", payload, path))?;
    T::try_from(raw).map_err(|_| {
        CodableError::malformed_payload(tag.as_str(), path, format!("{raw} is out of range"))
    })
}

fn decode_signed<T: TryFrom<i64>>(tag: ValueTag, payload: &Value, path: &str) -> CodableResult<T> {
    let raw = payload
        .as_i64()
        .ok_or_else(|| unexpected(tag, "a signed integer", payload, path))?;
    T::try_from(raw).map_err(|_| {
        CodableError::malformed_payload(tag.as_str(), path, format!("{raw} is out of range"))
    })
}

fn decode_decimal(tag: ValueTag, payload: &Value, path: &str) -> CodableResult<Decimal> {
    let text = match payload {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => return Err(unexpected(tag, "a string or number", other, path)),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| {
            CodableError::malformed_payload(tag.as_str(), path, format!("invalid decimal `{text}`: {e}"))
        })
}

fn expect_str<'a>(tag: ValueTag, payload: &'a Value, path: &str) -> CodableResult<&'a str> {
    payload
        .as_str()
        .ok_or_else(|| unexpected(tag, "a string", payload, path))
}

fn expect_f64(tag: ValueTag, payload: &Value, path: &str) -> CodableResult<f64> {
    payload
        .as_f64()
        .ok_or_else(|| unexpected(tag, "a number", payload, path))
}

fn expect_array<'a>(tag: ValueTag, payload: &'a Value, path: &str) -> CodableResult<&'a Vec<Value>> {
    payload
        .as_array()
        .ok_or_else(|| unexpected(tag, "an array", payload, path))
}

fn unexpected(tag: ValueTag, expected: &str, found: &Value, path: &str) -> CodableError {
    CodableError::malformed_payload(
        tag.as_str(),
        path,
        format!("expected {expected}, found {}", kind(found)),
    )
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use crate::{AnyValue, CodableError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_pair_is_written_as_array() {
        let pair = AnyValue::from((AnyValue::from(1i64), AnyValue::from("two")));
        let document = pair.encode().unwrap();
        assert_eq!(
            document,
            json!({
                "type": "Array",
                "value": [
                    {"type": "Int64", "value": 1},
                    {"type": "String", "value": "two"}
                ]
            })
        );
    }

    #[test]
    fn test_error_paths_point_at_the_nested_node() {
        struct Opaque;
        let value = AnyValue::from(vec![
            AnyValue::from(1u8),
            AnyValue::from(vec![AnyValue::new(Opaque)]),
        ]);

        match value.encode() {
            Err(CodableError::UnsupportedType { path, type_name }) => {
                assert_eq!(path, "$[1][0]");
                assert!(type_name.ends_with("Opaque"));
            }
            other => panic!("expected UnsupportedType, got {:?}", other),
        }

        let document = json!({
            "type": "Dictionary",
            "value": {"inner": {"type": "UInt8", "value": 300}}
        });
        match AnyValue::decode(&document) {
            Err(CodableError::MalformedPayload { tag, path, .. }) => {
                assert_eq!(tag, "UInt8");
                assert_eq!(path, "$.inner");
            }
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_error_paths_quote_awkward_keys() {
        let document = json!({
            "type": "Dictionary",
            "value": {
                "a.b": {
                    "type": "Dictionary",
                    "value": {"": {"type": "Bool", "value": 1}}
                }
            }
        });
        match AnyValue::decode(&document) {
            Err(CodableError::MalformedPayload { path, .. }) => {
                assert_eq!(path, r#"$["a.b"][""]"#);
            }
            other => panic!("expected MalformedPayload, got {:?}", other),
        }

        let value: AnyValue = [("x[0]", AnyValue::from(f64::NAN))].into_iter().collect();
        match value.encode() {
            Err(CodableError::NonFiniteFloat { path }) => assert_eq!(path, r#"$["x[0]"]"#),
            other => panic!("expected NonFiniteFloat, got {:?}", other),
        }
    }

    #[test]
    fn test_date_offset_pushing_year_out_of_range_is_malformed() {
        let document = json!({"type": "Date", "value": "0000-01-01T00:00:00+01:00"});
        assert!(matches!(
            AnyValue::decode(&document),
            Err(CodableError::MalformedPayload { ref tag, .. }) if tag == "Date"
        ));
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        let result = AnyValue::from(f64::NAN).encode();
        assert!(matches!(result, Err(CodableError::NonFiniteFloat { .. })));

        let result = AnyValue::from(f32::INFINITY).encode();
        assert!(matches!(result, Err(CodableError::NonFiniteFloat { .. })));
    }

    #[test]
    fn test_float_outside_f32_range_is_malformed() {
        let document = json!({"type": "Float", "value": 1e300});
        assert!(matches!(
            AnyValue::decode(&document),
            Err(CodableError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_double_accepts_integer_literal() {
        let document = json!({"type": "Double", "value": 3});
        assert_eq!(AnyValue::decode(&document).unwrap().get::<f64>(), Some(3.0));
    }

    #[test]
    fn test_envelope_errors() {
        for document in [
            json!(42),
            json!({"value": 1}),
            json!({"type": 7, "value": 1}),
            json!({"type": "Int"}),
        ] {
            assert!(
                matches!(
                    AnyValue::decode(&document),
                    Err(CodableError::MalformedDocument { .. })
                ),
                "{}",
                document
            );
        }
    }

    #[test]
    fn test_decimal_accepts_number_and_scientific() {
        let from_number = AnyValue::decode(&json!({"type": "Decimal", "value": 2.5})).unwrap();
        assert_eq!(from_number.encode().unwrap(), json!({"type": "Decimal", "value": "2.5"}));

        let from_scientific =
            AnyValue::decode(&json!({"type": "Decimal", "value": "1e-3"})).unwrap();
        assert_eq!(
            from_scientific.encode().unwrap(),
            json!({"type": "Decimal", "value": "0.001"})
        );
    }
}
