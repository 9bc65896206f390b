//! Error types for the tally_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tally_core operations.
///
/// Every data failure carries the offending field name and enough context
/// (entity id, donation index) to locate it. There is no local recovery:
/// callers catch at a coarse boundary and present the message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required attribute is absent
    #[error("{field} is missing ({context})")]
    MissingField { field: String, context: String },

    /// A numeric field holds NaN or an infinity
    #[error("{field} is not a usable number ({context}): {value}")]
    NotANumber {
        field: String,
        context: String,
        value: f64,
    },

    /// A value is present and numeric but outside its valid range
    #[error("{field} out of range ({context}): {message}")]
    Domain {
        field: String,
        context: String,
        message: String,
    },

    /// An id reference does not resolve against its table
    #[error("{kind} '{id}' not found ({context})")]
    MissingReference {
        kind: &'static str,
        id: String,
        context: String,
    },

    /// A direct lookup by id failed
    #[error("no {kind} with id '{id}'")]
    Lookup { kind: &'static str, id: String },

    /// An explicit guard fired where naive logic would have substituted a
    /// fallback value
    #[error("refusing to substitute a fallback value: {0}")]
    NoFallback(String),

    /// The startup validation pass found one or more problems; the message
    /// aggregates every individual failure
    #[error("dataset failed validation:\n{0}")]
    DatasetInvalid(String),

    /// A calculation could not produce a usable result
    #[error("calculation error: {0}")]
    Calculation(String),

    /// Configuration validation error
    #[error("configuration error: {0}")]
    Config(String),
}
