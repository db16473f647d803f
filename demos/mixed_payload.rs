use sovran_anycodable::{AnyValue, CodableError};
use std::collections::HashMap;

// A settings record from some plugin we know nothing about at compile time
struct PluginHandle;

fn build_payload() -> AnyValue {
    let mut settings = HashMap::new();
    settings.insert("retries".to_string(), AnyValue::new(3u8));
    settings.insert("timeout_ms".to_string(), AnyValue::new(2500u32));
    settings.insert("endpoint".to_string(), AnyValue::new("https://api.example.com"));
    settings.insert(
        "weights".to_string(),
        AnyValue::new(vec![AnyValue::new(0.25), AnyValue::new(0.75)]),
    );
    AnyValue::new(settings)
}

fn main() -> Result<(), CodableError> {
    let payload = build_payload();

    // Encode to text and back again
    let text = payload.to_json_string()?;
    println!("Encoded: {}", text);

    let decoded = AnyValue::from_json_str(&text)?;

    // Read entries back using their original types
    if let Some(settings) = decoded.as_map() {
        match settings.get("retries").and_then(|v| v.get::<u8>()) {
            Some(retries) => println!("Retries: {}", retries),
            None => println!("Retries missing or not a u8"),
        }

        // Asking for the wrong type just yields None
        let timeout_as_string = settings.get("timeout_ms").and_then(|v| v.get::<String>());
        println!("timeout_ms as String: {:?}", timeout_as_string);

        if let Some(weights) = settings.get("weights").and_then(|v| v.as_slice()) {
            let total: f64 = weights.iter().filter_map(|w| w.get::<f64>()).sum();
            println!("Weights sum to {}", total);
        }
    }

    // A pair travels as a two element array
    let pair = AnyValue::new((AnyValue::new(1), AnyValue::new("two")));
    println!("Pair encodes as: {}", pair.to_json_string()?);

    // Unsupported values are accepted at construction but refuse to encode
    let with_handle = AnyValue::new(vec![AnyValue::new(1), AnyValue::new(PluginHandle)]);
    match with_handle.encode() {
        Ok(_) => println!("This shouldn't happen - the handle can't be encoded"),
        Err(CodableError::UnsupportedType { type_name, path }) => {
            println!("Correctly rejected {} at {}", type_name, path)
        }
        Err(e) => println!("Unexpected error: {}", e),
    }

    // Unknown tags are reported with the offending tag
    match AnyValue::from_json_str(r#"{"type":"NotARealTag","value":0}"#) {
        Ok(_) => println!("This shouldn't happen - the tag is unknown"),
        Err(e) => println!("Decode failed as expected: {}", e),
    }

    Ok(())
}
