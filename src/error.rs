use thiserror::Error;

/// Boxed error returned by user predicates and transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid field name: \"{0}\"")]
    InvalidFieldName(String),

    #[error("Hide predicate for \"{path}\" failed: {source}")]
    Predicate {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Transform failed: {0}")]
    Transform(#[source] BoxError),

    #[error("Unknown path \"{0}\"")]
    UnknownPath(String),

    #[error("Path \"{0}\" is not a reference and cannot be populated")]
    NotARef(String),

    #[error("Model \"{0}\" is not registered")]
    ModelNotFound(String),

    #[error("Model \"{0}\" is already registered")]
    DuplicateModel(String),

    #[error("Maximum serialization depth exceeded ({0})")]
    DepthExceeded(usize),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
