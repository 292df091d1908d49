use thiserror::Error;

/// Core error type shared across Seedwright crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// The schema snapshot could not be read.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results returned by Seedwright crates.
pub type Result<T> = std::result::Result<T, Error>;
