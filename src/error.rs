use thiserror::Error;

/// Errors that can occur when encoding or decoding an `AnyValue`
///
/// Every variant that refers to a node of the value graph carries a `path`
/// (`$` for the root, `$[1]` for an array element, `$.key` for a dictionary
/// entry) so a failure deep inside a nested document can be located.
#[derive(Debug, Error)]
pub enum CodableError {
    /// The value was constructed from a type outside the supported set
    #[error("unsupported type `{type_name}` can not be encoded (at {path})")]
    UnsupportedType {
        type_name: &'static str,
        path: String,
    },
    /// A float was NaN or infinite, which the document format can't carry
    #[error("non-finite float can not be encoded (at {path})")]
    NonFiniteFloat { path: String },
    /// A timestamp's year can't be written as RFC 3339 (0000 to 9999)
    #[error("timestamp year {year} is outside 0000-9999 and can not be encoded (at {path})")]
    DateOutOfRange { year: i32, path: String },
    /// The `type` discriminator named no known variant
    #[error("unrecognized type tag `{tag}` (at {path})")]
    UnrecognizedTag { tag: String, path: String },
    /// The `value` field doesn't have the shape its tag requires
    #[error("malformed `{tag}` payload at {path}: {reason}")]
    MalformedPayload {
        tag: String,
        path: String,
        reason: String,
    },
    /// The `{type, value}` envelope itself is broken
    #[error("malformed document at {path}: {reason}")]
    MalformedDocument { path: String, reason: String },
    /// Text could not be parsed as, or printed from, a document
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Shorthand for results produced by this crate
pub type CodableResult<T> = Result<T, CodableError>;

impl CodableError {
    pub(crate) fn malformed_payload(
        tag: impl Into<String>,
        path: &str,
        reason: impl Into<String>,
    ) -> Self {
        CodableError::MalformedPayload {
            tag: tag.into(),
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_document(path: &str, reason: impl Into<String>) -> Self {
        CodableError::MalformedDocument {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
