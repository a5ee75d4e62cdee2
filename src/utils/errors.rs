use thiserror::Error;

/// Main error type for navtile
#[derive(Error, Debug)]
pub enum NavtileError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("map layer error: {0}")]
    LayerError(String),
}
