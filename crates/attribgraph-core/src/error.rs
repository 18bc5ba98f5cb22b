use thiserror::Error;

/// The only fatal condition in normalization: the input is not a graph
/// document at all.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("graph document is missing the `{collection}` collection")]
    MissingCollection { collection: &'static str },

    #[error("graph document field `{collection}` is not an array")]
    NotACollection { collection: &'static str },

    #[error("graph document root is not a JSON object")]
    NotAnObject,

    #[error("graph document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
