use crate::error::CodableError;
use std::fmt;
use std::str::FromStr;

/// The discriminator written to the `type` field of an encoded document
///
/// The spellings returned by [`ValueTag::as_str`] are the wire format and
/// must not change; documents produced by other encoders rely on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum ValueTag {
    String,
    UInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    Bool,
    Array,
    Dictionary,
    /// Only ever read from the wire; pairs are written as `Array`
    Tuple,
    Data,
    Date,
    URL,
    Decimal,
    /// Never written; encoding an unsupported value fails instead
    Unsupported,
}

impl ValueTag {
    /// Every tag that may appear in a document's `type` field
    pub const WIRE_TAGS: [ValueTag; 21] = [
        ValueTag::String,
        ValueTag::UInt,
        ValueTag::UInt8,
        ValueTag::UInt16,
        ValueTag::UInt32,
        ValueTag::UInt64,
        ValueTag::Int,
        ValueTag::Int8,
        ValueTag::Int16,
        ValueTag::Int32,
        ValueTag::Int64,
        ValueTag::Float,
        ValueTag::Double,
        ValueTag::Bool,
        ValueTag::Array,
        ValueTag::Dictionary,
        ValueTag::Tuple,
        ValueTag::Data,
        ValueTag::Date,
        ValueTag::URL,
        ValueTag::Decimal,
    ];

    /// The exact spelling used in a document's `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueTag::String => "String",
            ValueTag::UInt => "UInt",
            ValueTag::UInt8 => "UInt8",
            ValueTag::UInt16 => "UInt16",
            ValueTag::UInt32 => "UInt32",
            ValueTag::UInt64 => "UInt64",
            ValueTag::Int => "Int",
            ValueTag::Int8 => "Int8",
            ValueTag::Int16 => "Int16",
            ValueTag::Int32 => "Int32",
            ValueTag::Int64 => "Int64",
            ValueTag::Float => "Float",
            ValueTag::Double => "Double",
            ValueTag::Bool => "Bool",
            ValueTag::Array => "Array",
            ValueTag::Dictionary => "Dictionary",
            ValueTag::Tuple => "Tuple",
            ValueTag::Data => "Data",
            ValueTag::Date => "Date",
            ValueTag::URL => "URL",
            ValueTag::Decimal => "Decimal",
            ValueTag::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueTag {
    type Err = CodableError;

    /// Parses a wire tag. `Unsupported` is not a wire tag and is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueTag::WIRE_TAGS
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| CodableError::UnrecognizedTag {
                tag: s.to_string(),
                path: "$".to_string(),
            })
    }
}
