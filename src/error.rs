use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxpipeError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid subtitle document: {0}")]
    InvalidSubtitle(String),

    #[error("Media probe failed: {0}")]
    Media(String),

    #[error("Audio encoding failed: {0}")]
    Audio(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, VoxpipeError>;
