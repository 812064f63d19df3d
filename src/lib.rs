pub mod config;
pub mod error;
pub mod gemini;
pub mod media;
pub mod output;
pub mod subtitle;
pub mod text;
pub mod translate;
pub mod tts;

pub use config::Config;
pub use error::{Result, VoxpipeError};
pub use subtitle::{is_valid_srt, validate_srt};
pub use text::{normalize, split_text};
