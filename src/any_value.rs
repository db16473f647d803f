use crate::tag::ValueTag;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A self-describing dynamic value
///
/// Each variant carries a concretely typed payload, so the discriminator
/// written to the wire can never disagree with what is stored. Composite
/// variants hold further `AnyValue`s, which lets an array or dictionary mix
/// element types freely while each leaf keeps its own type.
///
/// Values are immutable once built; there are no setters and composite
/// variants own their children.
#[derive(Debug, Clone)]
pub enum AnyValue {
    String(String),
    UInt(usize),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Int(isize),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Array(Vec<AnyValue>),
    Map(HashMap<String, AnyValue>),
    /// Has no wire representation of its own: it is written as a
    /// two-element `Array`.
    Pair(Box<(AnyValue, AnyValue)>),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Url(Url),
    Decimal(Decimal),
    /// A value of a type outside the supported set. Constructing one always
    /// succeeds; encoding it always fails.
    Unsupported(Unsupported),
}

/// A type-erased value that `AnyValue` can hold but not encode
#[derive(Clone)]
pub struct Unsupported {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Unsupported {
    /// Name of the Rust type the value was constructed from
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get a reference to the contained value if it is of type T
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Unsupported")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// Moves the payload into `$variant` and returns early if the box holds `$ty`,
// otherwise hands the box back for the next test.
macro_rules! take_variant {
    ($boxed:ident, $ty:ty, $variant:path) => {
        let $boxed = match $boxed.downcast::<$ty>() {
            Ok(payload) => return $variant(*payload),
            Err(other) => other,
        };
    };
}

impl AnyValue {
    /// Create a new AnyValue from a value of any type
    ///
    /// The concrete type of `value` picks the variant. Types outside the
    /// supported set become [`AnyValue::Unsupported`]; this never fails, the
    /// error is reported by [`AnyValue::encode`] instead. Passing an
    /// `AnyValue` returns it unchanged, and a `&'static str` is stored as a
    /// `String`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_anycodable::{AnyValue, ValueTag};
    ///
    /// assert_eq!(AnyValue::new(42u8).tag(), ValueTag::UInt8);
    /// assert_eq!(AnyValue::new("hi").tag(), ValueTag::String);
    ///
    /// struct Custom;
    /// assert!(!AnyValue::new(Custom).is_supported());
    /// ```
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let type_name = type_name::<T>();
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);

        let boxed = match boxed.downcast::<AnyValue>() {
            Ok(value) => return *value,
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<&'static str>() {
            Ok(text) => return AnyValue::String((*text).to_string()),
            Err(other) => other,
        };
        take_variant!(boxed, String, AnyValue::String);
        take_variant!(boxed, usize, AnyValue::UInt);
        take_variant!(boxed, u8, AnyValue::UInt8);
        take_variant!(boxed, u16, AnyValue::UInt16);
        take_variant!(boxed, u32, AnyValue::UInt32);
        take_variant!(boxed, u64, AnyValue::UInt64);
        take_variant!(boxed, isize, AnyValue::Int);
        take_variant!(boxed, i8, AnyValue::Int8);
        take_variant!(boxed, i16, AnyValue::Int16);
        take_variant!(boxed, i32, AnyValue::Int32);
        take_variant!(boxed, i64, AnyValue::Int64);
        take_variant!(boxed, f32, AnyValue::Float32);
        take_variant!(boxed, f64, AnyValue::Float64);
        take_variant!(boxed, bool, AnyValue::Bool);
        take_variant!(boxed, Vec<AnyValue>, AnyValue::Array);
        take_variant!(boxed, HashMap<String, AnyValue>, AnyValue::Map);
        let boxed = match boxed.downcast::<(AnyValue, AnyValue)>() {
            Ok(pair) => return AnyValue::Pair(pair),
            Err(other) => other,
        };
        take_variant!(boxed, Vec<u8>, AnyValue::Bytes);
        take_variant!(boxed, DateTime<Utc>, AnyValue::Timestamp);
        take_variant!(boxed, Url, AnyValue::Url);
        take_variant!(boxed, Decimal, AnyValue::Decimal);

        AnyValue::Unsupported(Unsupported {
            type_name,
            value: Arc::from(boxed),
        })
    }

    /// The discriminator of the stored variant
    ///
    /// A pair reports [`ValueTag::Tuple`] here even though it is encoded as
    /// an `Array`.
    pub fn tag(&self) -> ValueTag {
        match self {
            AnyValue::String(_) => ValueTag::String,
            AnyValue::UInt(_) => ValueTag::UInt,
            AnyValue::UInt8(_) => ValueTag::UInt8,
            AnyValue::UInt16(_) => ValueTag::UInt16,
            AnyValue::UInt32(_) => ValueTag::UInt32,
            AnyValue::UInt64(_) => ValueTag::UInt64,
            AnyValue::Int(_) => ValueTag::Int,
            AnyValue::Int8(_) => ValueTag::Int8,
            AnyValue::Int16(_) => ValueTag::Int16,
            AnyValue::Int32(_) => ValueTag::Int32,
            AnyValue::Int64(_) => ValueTag::Int64,
            AnyValue::Float32(_) => ValueTag::Float,
            AnyValue::Float64(_) => ValueTag::Double,
            AnyValue::Bool(_) => ValueTag::Bool,
            AnyValue::Array(_) => ValueTag::Array,
            AnyValue::Map(_) => ValueTag::Dictionary,
            AnyValue::Pair(_) => ValueTag::Tuple,
            AnyValue::Bytes(_) => ValueTag::Data,
            AnyValue::Timestamp(_) => ValueTag::Date,
            AnyValue::Url(_) => ValueTag::URL,
            AnyValue::Decimal(_) => ValueTag::Decimal,
            AnyValue::Unsupported(_) => ValueTag::Unsupported,
        }
    }

    /// False only for [`AnyValue::Unsupported`]
    ///
    /// Nested values are not inspected; an array holding an unsupported
    /// element is itself supported but still fails to encode.
    pub fn is_supported(&self) -> bool {
        !matches!(self, AnyValue::Unsupported(_))
    }

    fn payload(&self) -> &dyn Any {
        let payload: &dyn Any = match self {
            AnyValue::String(v) => v,
            AnyValue::UInt(v) => v,
            AnyValue::UInt8(v) => v,
            AnyValue::UInt16(v) => v,
            AnyValue::UInt32(v) => v,
            AnyValue::UInt64(v) => v,
            AnyValue::Int(v) => v,
            AnyValue::Int8(v) => v,
            AnyValue::Int16(v) => v,
            AnyValue::Int32(v) => v,
            AnyValue::Int64(v) => v,
            AnyValue::Float32(v) => v,
            AnyValue::Float64(v) => v,
            AnyValue::Bool(v) => v,
            AnyValue::Array(v) => v,
            AnyValue::Map(v) => v,
            AnyValue::Pair(v) => &**v,
            AnyValue::Bytes(v) => v,
            AnyValue::Timestamp(v) => v,
            AnyValue::Url(v) => v,
            AnyValue::Decimal(v) => v,
            AnyValue::Unsupported(v) => &*v.value,
        };
        payload
    }

    /// Check if the contained value is of type T
    pub fn is<T: Any>(&self) -> bool {
        self.payload().is::<T>()
    }

    /// Get a reference to the contained value if it is of type T
    ///
    /// A pair's payload is `(AnyValue, AnyValue)`, an array's is
    /// `Vec<AnyValue>` and a dictionary's is `HashMap<String, AnyValue>`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload().downcast_ref::<T>()
    }

    /// Get a copy of the contained value if it is of type T
    ///
    /// Returns `None` on a type mismatch; no numeric widening or other
    /// coercion is attempted.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_anycodable::AnyValue;
    ///
    /// let value = AnyValue::new(7i64);
    /// assert_eq!(value.get::<i64>(), Some(7));
    /// assert_eq!(value.get::<i32>(), None);
    /// assert_eq!(value.get::<String>(), None);
    /// ```
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// The elements of an `Array`, or `None` for any other variant
    pub fn as_slice(&self) -> Option<&[AnyValue]> {
        match self {
            AnyValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Both halves of a `Pair`, or `None` for any other variant
    pub fn as_pair(&self) -> Option<(&AnyValue, &AnyValue)> {
        match self {
            AnyValue::Pair(pair) => Some((&pair.0, &pair.1)),
            _ => None,
        }
    }

    /// The entries of a `Map`, or `None` for any other variant
    pub fn as_map(&self) -> Option<&HashMap<String, AnyValue>> {
        match self {
            AnyValue::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for AnyValue {
    /// Variants compare by payload. Unsupported values are only equal to
    /// clones of themselves.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnyValue::String(a), AnyValue::String(b)) => a == b,
            (AnyValue::UInt(a), AnyValue::UInt(b)) => a == b,
            (AnyValue::UInt8(a), AnyValue::UInt8(b)) => a == b,
            (AnyValue::UInt16(a), AnyValue::UInt16(b)) => a == b,
            (AnyValue::UInt32(a), AnyValue::UInt32(b)) => a == b,
            (AnyValue::UInt64(a), AnyValue::UInt64(b)) => a == b,
            (AnyValue::Int(a), AnyValue::Int(b)) => a == b,
            (AnyValue::Int8(a), AnyValue::Int8(b)) => a == b,
            (AnyValue::Int16(a), AnyValue::Int16(b)) => a == b,
            (AnyValue::Int32(a), AnyValue::Int32(b)) => a == b,
            (AnyValue::Int64(a), AnyValue::Int64(b)) => a == b,
            (AnyValue::Float32(a), AnyValue::Float32(b)) => a == b,
            (AnyValue::Float64(a), AnyValue::Float64(b)) => a == b,
            (AnyValue::Bool(a), AnyValue::Bool(b)) => a == b,
            (AnyValue::Array(a), AnyValue::Array(b)) => a == b,
            (AnyValue::Map(a), AnyValue::Map(b)) => a == b,
            (AnyValue::Pair(a), AnyValue::Pair(b)) => a == b,
            (AnyValue::Bytes(a), AnyValue::Bytes(b)) => a == b,
            (AnyValue::Timestamp(a), AnyValue::Timestamp(b)) => a == b,
            (AnyValue::Url(a), AnyValue::Url(b)) => a == b,
            (AnyValue::Decimal(a), AnyValue::Decimal(b)) => a == b,
            (AnyValue::Unsupported(a), AnyValue::Unsupported(b)) => Arc::ptr_eq(&a.value, &b.value),
            _ => false,
        }
    }
}

macro_rules! impl_from_payload {
    ($($ty:ty => $variant:path),* $(,)?) => {
        $(
            impl From<$ty> for AnyValue {
                fn from(value: $ty) -> Self {
                    $variant(value)
                }
            }
        )*
    };
}

impl_from_payload! {
    String => AnyValue::String,
    usize => AnyValue::UInt,
    u8 => AnyValue::UInt8,
    u16 => AnyValue::UInt16,
    u32 => AnyValue::UInt32,
    u64 => AnyValue::UInt64,
    isize => AnyValue::Int,
    i8 => AnyValue::Int8,
    i16 => AnyValue::Int16,
    i32 => AnyValue::Int32,
    i64 => AnyValue::Int64,
    f32 => AnyValue::Float32,
    f64 => AnyValue::Float64,
    bool => AnyValue::Bool,
    Vec<AnyValue> => AnyValue::Array,
    HashMap<String, AnyValue> => AnyValue::Map,
    Vec<u8> => AnyValue::Bytes,
    DateTime<Utc> => AnyValue::Timestamp,
    Url => AnyValue::Url,
    Decimal => AnyValue::Decimal,
}

impl From<&str> for AnyValue {
    fn from(value: &str) -> Self {
        AnyValue::String(value.to_string())
    }
}

impl From<(AnyValue, AnyValue)> for AnyValue {
    fn from(pair: (AnyValue, AnyValue)) -> Self {
        AnyValue::Pair(Box::new(pair))
    }
}

impl FromIterator<AnyValue> for AnyValue {
    fn from_iter<I: IntoIterator<Item = AnyValue>>(iter: I) -> Self {
        AnyValue::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, AnyValue)> for AnyValue {
    fn from_iter<I: IntoIterator<Item = (K, AnyValue)>>(iter: I) -> Self {
        AnyValue::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
