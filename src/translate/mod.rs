//! SRT translation with validation-gated output.

pub mod gemini;

pub use gemini::GeminiTranslator;

use crate::error::{Result, VoxpipeError};
use crate::output::{ensure_extension, write_atomic};
use crate::subtitle::{compare_structure, validate_srt};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Model output for one translated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Response text exactly as returned.
    pub raw: String,
    /// Response text with surrounding whitespace removed.
    pub cleaned: String,
}

impl Translation {
    pub fn from_raw(raw: String) -> Self {
        let cleaned = raw.trim().to_string();
        Self { raw, cleaned }
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate the subtitle text of an SRT document, keeping indices and
    /// timecodes intact.
    async fn translate_srt(&self, document: &str, target_language: &str) -> Result<Translation>;
    fn name(&self) -> &'static str;
}

/// Where a translation run left its output.
#[derive(Debug, Clone)]
pub struct TranslateOutcome {
    pub output_path: PathBuf,
    pub blocks: usize,
    /// Structural differences from the source, reported but not fatal.
    pub drift: Vec<String>,
}

/// Default output path: `<stem>.<language>.<ext>` next to the input, with
/// spaces in the language replaced by underscores.
pub fn derive_output_path(input: &Path, target_language: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let safe_lang = target_language.replace(' ', "_");
    let name = match input.extension() {
        Some(ext) => format!("{}.{}.{}", stem, safe_lang, ext.to_string_lossy()),
        None => format!("{}.{}", stem, safe_lang),
    };
    input.with_file_name(name)
}

/// Path used to keep the raw model response when validation fails.
pub fn raw_debug_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".raw.txt");
    PathBuf::from(name)
}

/// Translate an SRT file and write the result.
///
/// The translated text is written only if it passes SRT validation.
/// Otherwise the raw response is saved next to the intended output as
/// `<output>.raw.txt` and an [`VoxpipeError::InvalidSubtitle`] is returned.
pub async fn translate_file(
    translator: &dyn Translator,
    input: &Path,
    target_language: &str,
    output: Option<&Path>,
) -> Result<TranslateOutcome> {
    if !input.exists() {
        return Err(VoxpipeError::FileNotFound(input.display().to_string()));
    }

    let source = tokio::fs::read_to_string(input).await?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derive_output_path(input, target_language));

    info!(
        "Translating {} -> language: {} using {}",
        input.display(),
        target_language,
        translator.name()
    );

    let translation = translator.translate_srt(&source, target_language).await?;

    let issues = validate_srt(&translation.cleaned);
    if !issues.is_empty() {
        for issue in &issues {
            warn!("Translated output: {}", issue);
        }
        let raw_path = raw_debug_path(&output);
        write_atomic(&raw_path, translation.raw.as_bytes())?;
        return Err(VoxpipeError::InvalidSubtitle(format!(
            "translated output failed SRT validation ({} issue(s)); raw output saved to {}",
            issues.len(),
            raw_path.display()
        )));
    }

    let drift = compare_structure(&source, &translation.cleaned);
    for note in &drift {
        warn!("Structure drift: {}", note);
    }

    let output_path = ensure_extension(&output, "srt");
    write_atomic(&output_path, translation.cleaned.as_bytes())?;

    let blocks = crate::subtitle::validate::split_blocks(&translation.cleaned).len();
    info!("Wrote translated srt to {}", output_path.display());

    Ok(TranslateOutcome {
        output_path,
        blocks,
        drift,
    })
}
