//! Error types for map loading

/// Result type alias
pub type Result<T> = std::result::Result<T, MapError>;

/// Fatal problems with a map header. Body lines never produce errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapParseError {
    #[error("map text is empty")]
    EmptyInput,

    #[error("map header is missing field {index} (expected cols,rows,cellSize,margin)")]
    MissingHeaderField { index: usize },

    #[error("map header field `{field}` is not a number: {value:?}")]
    InvalidHeaderNumber { field: &'static str, value: String },

    #[error("map header describes an empty or degenerate grid: {0}")]
    InvalidDimensions(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Map parse error: {0}")]
    Parse(#[from] MapParseError),

    #[error("Map not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
