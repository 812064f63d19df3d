pub mod gemini;
pub mod wav;

pub use gemini::GeminiSpeech;

use crate::config::DEFAULT_VOICE;
use crate::error::{Result, VoxpipeError};
use crate::output::write_atomic;
use crate::text::split_text;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Audio returned by a synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerVoice {
    pub speaker: String,
    pub voice: String,
}

/// Which prebuilt voice(s) to speak with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    Single(String),
    /// Speaker labels in the text mapped to voices.
    MultiSpeaker(Vec<SpeakerVoice>),
}

impl Default for VoiceSelection {
    fn default() -> Self {
        VoiceSelection::Single(DEFAULT_VOICE.to_string())
    }
}

/// Parse a `Label:VoiceName` mapping, splitting on the first colon.
pub fn parse_speaker_mapping(s: &str) -> std::result::Result<SpeakerVoice, String> {
    match s.split_once(':') {
        Some((speaker, voice)) if !speaker.trim().is_empty() && !voice.trim().is_empty() => {
            Ok(SpeakerVoice {
                speaker: speaker.trim().to_string(),
                voice: voice.trim().to_string(),
            })
        }
        _ => Err(format!(
            "Invalid speaker mapping '{}'. Use the format 'Label:VoiceName'",
            s
        )),
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioClip>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct NarrationResult {
    pub output_path: PathBuf,
    pub chunks: usize,
    pub bytes: usize,
    pub mime_type: String,
}

/// Synthesize `text` chunk by chunk and write a single audio file.
///
/// Text is split with [`split_text`] so every request stays within
/// `max_chars` (apart from single oversized sentences). Raw PCM is wrapped
/// in WAV and the output extension set to `.wav`. WAV files from several
/// chunks are decoded and joined into one file. Other container formats
/// keep their own extension but cannot be joined, so they are accepted
/// only when the text fits in one chunk. The cancel flag is checked between
/// chunks.
pub async fn narrate(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    max_chars: usize,
    output: &Path,
    cancelled: &AtomicBool,
    show_progress: bool,
) -> Result<NarrationResult> {
    let chunks = split_text(text, max_chars);
    if chunks.is_empty() {
        return Err(VoxpipeError::Config("nothing to synthesize".to_string()));
    }

    info!(
        "Synthesizing {} chunk(s) with {} (max {} chars)",
        chunks.len(),
        synthesizer.name(),
        max_chars
    );

    let pb = show_progress.then(|| {
        let pb = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Synthesizing...");
        pb
    });

    let mut clips: Vec<Vec<u8>> = Vec::with_capacity(chunks.len());
    let mut mime_type: Option<String> = None;

    for (i, chunk) in chunks.iter().enumerate() {
        if cancelled.load(Ordering::Relaxed) {
            if let Some(pb) = &pb {
                pb.abandon_with_message("Cancelled");
            }
            return Err(VoxpipeError::Cancelled(format!(
                "narration stopped after {} of {} chunks",
                i,
                chunks.len()
            )));
        }

        debug!("Chunk {}/{}: {} chars", i + 1, chunks.len(), chunk.chars().count());
        let clip = synthesizer.synthesize(chunk).await?;

        let expected = mime_type.get_or_insert_with(|| clip.mime_type.clone());
        if *expected != clip.mime_type {
            return Err(VoxpipeError::Audio(format!(
                "chunk {} returned {} but earlier chunks were {}",
                i + 1,
                clip.mime_type,
                expected
            )));
        }
        clips.push(clip.data);

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    let mime_type = mime_type.unwrap_or_default();
    let (output_path, bytes) = match wav::extension_for_mime(&mime_type) {
        None => (output.with_extension("wav"), wav::pcm_to_wav(&clips.concat(), &mime_type)?),
        Some("wav") => (output.with_extension("wav"), wav::concat_wav(&clips)?),
        Some(ext) if clips.len() == 1 => (output.with_extension(ext), clips.concat()),
        Some(_) => {
            return Err(VoxpipeError::Audio(format!(
                "cannot join {} chunks of {}; use a raw PCM or WAV voice output",
                clips.len(),
                mime_type
            )))
        }
    };

    write_atomic(&output_path, &bytes)?;

    if let Some(pb) = pb {
        pb.finish_with_message(format!("✓ {} chunk(s) synthesized", chunks.len()));
    }
    info!("Saved audio to {}", output_path.display());

    Ok(NarrationResult {
        output_path,
        chunks: chunks.len(),
        bytes: bytes.len(),
        mime_type,
    })
}
