//! Error types for the environment

use world::MapError;

/// Result type alias
pub type Result<T> = std::result::Result<T, EnvError>;

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error("Action index {index} outside action space of size {size}")]
    InvalidAction { index: usize, size: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Remote environment error: {0}")]
    Remote(String),
}

impl EnvError {
    /// True when a map reference did not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EnvError::Map(MapError::NotFound(_)))
    }
}
