use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongportError {
    #[error("unrecognized url: {0}")]
    Unrecognized(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
}

pub type SongportResult<T> = Result<T, SongportError>;
