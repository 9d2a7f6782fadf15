use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogAlertError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("missing field: {0}")]
    FieldMissing(String),

    #[error("entries rejected by event bus: keys [{0}]")]
    PublishRejected(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, LogAlertError>;
