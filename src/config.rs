use crate::error::{Result, VoxpipeError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default chunk length for narration, matching the pipeline's `split` step.
pub const DEFAULT_MAX_CHARS: usize = 1500;

pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_TRANSLATE_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_VOICE: &str = "Zephyr";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub tts_model: String,
    pub translate_model: String,
    pub voice: String,
    pub max_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            translate_model: DEFAULT_TRANSLATE_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents).map_err(|e| {
                    VoxpipeError::Config(format!(
                        "Failed to parse {}: {}",
                        config_path.display(),
                        e
                    ))
                })?;
            }
        }

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override fields from environment-style lookups.
    ///
    /// Unparseable numeric values are ignored and the previous value kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = lookup("VOXPIPE_TTS_MODEL") {
            self.tts_model = model;
        }
        if let Some(model) = lookup("VOXPIPE_TRANSLATE_MODEL") {
            self.translate_model = model;
        }
        if let Some(voice) = lookup("VOXPIPE_VOICE") {
            self.voice = voice;
        }
        if let Some(max_chars) = lookup("VOXPIPE_MAX_CHARS") {
            if let Ok(n) = max_chars.parse() {
                self.max_chars = n;
            }
        }
    }

    /// Check the settings needed by the Gemini-backed commands.
    pub fn validate(&self) -> Result<()> {
        match self.gemini_api_key.as_deref() {
            None | Some("") => {
                return Err(VoxpipeError::Config(
                    "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey"
                        .to_string(),
                ));
            }
            Some(_) => {}
        }

        Ok(())
    }

    pub fn api_key(&self) -> Result<&str> {
        self.gemini_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                VoxpipeError::Config(
                    "Gemini API key not set. Set GEMINI_API_KEY environment variable."
                        .to_string(),
                )
            })
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("voxpipe").join("config.toml"))
    }
}
