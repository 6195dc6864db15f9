use thiserror::Error;

/// Shown to the user for any failed exchange, whatever the cause.
pub const GENERIC_FAILURE: &str = "Something went wrong while generating response.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Failed to connect to server: {0}")]
    Connection(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ChatError {
    pub fn is_connection(&self) -> bool {
        matches!(self, ChatError::Connection(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ChatError::Stream(_))
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
