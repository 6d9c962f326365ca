use thiserror::Error;

/// Convenience result type for reshaping operations.
pub type ReshapeResult<T> = Result<T, ReshapeError>;

/// Error type shared by the decoder, the pivot write-back and the writers.
///
/// No-op outcomes (a pivot source that is missing or not a map, spreading over
/// a non-map root) are not errors and never surface here.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// The record envelope does not carry the expected item field.
    #[error("record envelope is missing the '{0}' field")]
    MissingField(String),

    /// A tagged attribute value is malformed (no, unknown or several type keys).
    #[error("malformed attribute value: {0}")]
    Decode(String),

    /// A number attribute carries text that is not a valid numeric literal.
    #[error("malformed number literal '{literal}'")]
    NumericFormat { literal: String },

    /// Strict navigation crossed a node that is absent or not a map.
    #[error("cannot navigate '{path}': segment '{segment}' is {reason}")]
    Navigation {
        path: String,
        segment: String,
        reason: &'static str,
    },

    /// Underlying I/O error while writing tables.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error outside of attribute decoding.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReshapeError {
    pub(crate) fn navigation<S: AsRef<str>>(
        path: &[S],
        segment: &str,
        reason: &'static str,
    ) -> Self {
        let path = path
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(".");
        ReshapeError::Navigation {
            path,
            segment: segment.to_string(),
            reason,
        }
    }
}
