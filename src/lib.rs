//! # sovran-anycodable
//!
//! A self-describing dynamic value that survives serialization with its type intact.
//!
//! `sovran-anycodable` provides [`AnyValue`], a closed tagged union over strings,
//! fixed-width integers, floats, booleans, byte blobs, timestamps, URLs, decimals
//! and recursive arrays, dictionaries and pairs. Every value is encoded as a small
//! `{"type": ..., "value": ...}` document, so a heterogeneous array or dictionary
//! can sit inside an otherwise strictly typed serde graph and still decode back
//! into exactly the types it was built from.
//!
//! ## Key Features
//!
//! - **Self-describing**: Each node carries its own type tag; no schema is needed to decode
//! - **Recursive**: Arrays, dictionaries and pairs embed further `AnyValue`s
//! - **Total construction**: [`AnyValue::new`] accepts any type and never fails
//! - **Loud encoding**: Unsupported types are rejected when encoded, never silently dropped
//! - **Soft reads**: [`AnyValue::get`] returns `None` on a type mismatch instead of erroring
//! - **serde native**: Implements `Serialize` and `Deserialize`
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_anycodable::{AnyValue, CodableError};
//!
//! fn main() -> Result<(), CodableError> {
//!     let value = AnyValue::new("Hello, World!");
//!
//!     let text = value.to_json_string()?;
//!     assert_eq!(text, r#"{"type":"String","value":"Hello, World!"}"#);
//!
//!     let decoded = AnyValue::from_json_str(&text)?;
//!     assert_eq!(decoded.get::<String>().as_deref(), Some("Hello, World!"));
//!
//!     // Asking for the wrong type is not an error
//!     assert_eq!(decoded.get::<i32>(), None);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Mixed Collections
//!
//! ```rust
//! use sovran_anycodable::{AnyValue, CodableError};
//! use std::collections::HashMap;
//!
//! fn main() -> Result<(), CodableError> {
//!     let array = AnyValue::new(vec![
//!         AnyValue::new(1i32),
//!         AnyValue::new("two"),
//!         AnyValue::new(3.0f64),
//!     ]);
//!
//!     let decoded = AnyValue::decode(&array.encode()?)?;
//!     let items = decoded.get::<Vec<AnyValue>>().unwrap_or_default();
//!     assert_eq!(items.len(), 3);
//!     assert_eq!(items[0].get::<i32>(), Some(1));
//!     assert_eq!(items[1].get::<String>().as_deref(), Some("two"));
//!     assert_eq!(items[2].get::<f64>(), Some(3.0));
//!
//!     let mut settings = HashMap::new();
//!     settings.insert("retries".to_string(), AnyValue::new(3u8));
//!     settings.insert("verbose".to_string(), AnyValue::new(true));
//!
//!     let decoded = AnyValue::decode(&AnyValue::new(settings).encode()?)?;
//!     let entries = decoded.as_map().cloned().unwrap_or_default();
//!     assert_eq!(entries["retries"].get::<u8>(), Some(3));
//!     assert_eq!(entries["verbose"].get::<bool>(), Some(true));
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Embedding in Typed Structures
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use sovran_anycodable::AnyValue;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Event {
//!     name: String,
//!     payload: AnyValue,
//! }
//!
//! let event = Event {
//!     name: "login".to_string(),
//!     payload: AnyValue::new(42u64),
//! };
//!
//! let text = serde_json::to_string(&event).unwrap();
//! let back: Event = serde_json::from_str(&text).unwrap();
//! assert_eq!(back.payload.get::<u64>(), Some(42));
//! ```
//!
//! ### Error Handling
//!
//! ```rust
//! use sovran_anycodable::{AnyValue, CodableError};
//!
//! struct Custom;
//!
//! // Construction always succeeds...
//! let value = AnyValue::new(Custom);
//!
//! // ...but encoding reports the unsupported type
//! match value.encode() {
//!     Ok(_) => println!("encoded"),
//!     Err(CodableError::UnsupportedType { type_name, .. }) => println!("can't encode {}", type_name),
//!     Err(e) => println!("Other error: {}", e),
//! }
//!
//! match AnyValue::from_json_str(r#"{"type":"NotARealTag","value":1}"#) {
//!     Err(CodableError::UnrecognizedTag { tag, .. }) => assert_eq!(tag, "NotARealTag"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```
//!
//! ## Pairs
//!
//! A pair has no wire representation of its own. [`AnyValue::Pair`] is encoded as
//! a two-element `Array`, so decoding it yields an [`AnyValue::Array`]. Documents
//! tagged `Tuple` are still accepted and decode into a pair.

mod any_value;
mod codec;
mod error;
mod tag;

pub use any_value::{AnyValue, Unsupported};
pub use error::{CodableError, CodableResult};
pub use tag::ValueTag;

// Re-export std::any for convenience
pub use std::any::{Any, TypeId};
