use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sovran_anycodable::AnyValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    id: u32,
    attributes: HashMap<String, AnyValue>,
    extra: Option<AnyValue>,
}

#[test]
fn test_typed_struct_with_dynamic_fields() {
    let mut attributes = HashMap::new();
    attributes.insert("count".to_string(), AnyValue::new(3u32));
    attributes.insert("label".to_string(), AnyValue::new("primary"));

    let envelope = Envelope {
        id: 7,
        attributes,
        extra: Some(AnyValue::new(vec![AnyValue::new(true), AnyValue::new(1.5)])),
    };

    let text = serde_json::to_string(&envelope).unwrap();
    let back: Envelope = serde_json::from_str(&text).unwrap();

    assert_eq!(back.id, 7);
    assert_eq!(back.attributes["count"].get::<u32>(), Some(3));
    assert_eq!(back.attributes["label"].get::<String>(), Some("primary".to_string()));

    let extra = back.extra.unwrap();
    let items = extra.as_slice().unwrap();
    assert_eq!(items[0].get::<bool>(), Some(true));
    assert_eq!(items[1].get::<f64>(), Some(1.5));
}

#[test]
fn test_serialize_matches_encode() {
    let value = AnyValue::new(vec![AnyValue::new(1u16), AnyValue::new("x")]);
    assert_eq!(serde_json::to_value(&value).unwrap(), value.encode().unwrap());
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({
            "type": "Array",
            "value": [
                {"type": "UInt16", "value": 1},
                {"type": "String", "value": "x"}
            ]
        })
    );
}

#[test]
fn test_serialize_surfaces_unsupported_type() {
    struct Handle;

    let envelope = Envelope {
        id: 1,
        attributes: HashMap::new(),
        extra: Some(AnyValue::new(Handle)),
    };

    let error = serde_json::to_string(&envelope).unwrap_err();
    assert!(error.to_string().contains("unsupported type"), "{}", error);
}

#[test]
fn test_deserialize_surfaces_decode_errors() {
    let text = r#"{"id": 1, "attributes": {"bad": {"type": "NotARealTag", "value": 0}}, "extra": null}"#;
    let error = serde_json::from_str::<Envelope>(text).unwrap_err();
    assert!(error.to_string().contains("NotARealTag"), "{}", error);

    let text = r#"{"id": 1, "attributes": {}, "extra": {"type": "Tuple", "value": []}}"#;
    let error = serde_json::from_str::<Envelope>(text).unwrap_err();
    assert!(error.to_string().contains("exactly 2 elements"), "{}", error);
}

#[test]
fn test_shared_across_threads() {
    let value = Arc::new(AnyValue::new(vec![AnyValue::new(10i64), AnyValue::new("ten")]));
    let mut handles = vec![];

    for _ in 0..4 {
        let value = Arc::clone(&value);
        handles.push(thread::spawn(move || value.to_json_string().unwrap()));
    }

    let expected = value.to_json_string().unwrap();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
