use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use voxpipe::config::Config;
use voxpipe::media::{check_ffprobe, compare_media, probe_media};
use voxpipe::output::write_atomic;
use voxpipe::subtitle::validate_srt;
use voxpipe::text::{init_default_splitter, split_text, splitter_for_language};
use voxpipe::translate::{translate_file, GeminiTranslator};
use voxpipe::tts::{narrate, parse_speaker_mapping, GeminiSpeech, SpeakerVoice, VoiceSelection};

#[derive(Parser)]
#[command(name = "voxpipe")]
#[command(version, about = "Lesson video content pipeline")]
#[command(
    long_about = "Split scripts into narration chunks, synthesize speech, translate and validate SRT subtitles, and check media clips before concatenation."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Split a text file into sentence-aligned chunks
    Split {
        /// Input text file
        input: PathBuf,

        /// Maximum characters per chunk
        #[arg(long, default_value_t = voxpipe::config::DEFAULT_MAX_CHARS)]
        max_chars: usize,

        /// Output JSON file
        #[arg(short, long, default_value = "chunks.json")]
        output: PathBuf,

        /// Sentence rules to use: en, zh, ja
        #[arg(long, default_value = "en")]
        language: String,
    },

    /// Check that a file is well-formed SRT
    Validate {
        /// SRT file to check
        input: PathBuf,
    },

    /// Translate an SRT file with Gemini
    Translate {
        /// Input SRT file
        input: PathBuf,

        /// Target language (e.g., English, Japanese)
        #[arg(short, long)]
        language: String,

        /// Output SRT file (defaults to <stem>.<language>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gemini model (defaults to the configured translate model)
        #[arg(short, long)]
        model: Option<String>,

        /// Language of the source subtitles
        #[arg(long, default_value = "Chinese")]
        source_language: String,
    },

    /// Synthesize speech from text with Gemini TTS
    Tts {
        /// Text file to read
        #[arg(short, long, default_value = "content.txt", conflicts_with = "text")]
        input: PathBuf,

        /// Text to speak directly instead of reading a file
        #[arg(short, long)]
        text: Option<String>,

        /// Speaker mapping for multi-speaker audio, e.g. 'Speaker 1:Zephyr'
        #[arg(short, long = "speaker", value_parser = parse_speaker_mapping)]
        speakers: Vec<SpeakerVoice>,

        /// Voice for single-speaker audio (defaults to the configured voice)
        #[arg(long)]
        voice: Option<String>,

        /// Sampling temperature
        #[arg(long = "temp", default_value_t = 1.0)]
        temperature: f32,

        /// Output audio file; the extension follows the returned format
        #[arg(short, long, default_value = "output.wav")]
        output: PathBuf,

        /// Maximum characters per request (defaults to the configured value)
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Compare resolution, frame rate and audio layout of two clips
    CheckMedia {
        first: PathBuf,
        second: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn voice_selection(speakers: Vec<SpeakerVoice>, voice: Option<String>, config: &Config) -> VoiceSelection {
    if speakers.is_empty() {
        VoiceSelection::Single(voice.unwrap_or_else(|| config.voice.clone()))
    } else {
        VoiceSelection::MultiSpeaker(speakers)
    }
}

/// Chunk length for `tts`: the flag if given, else the configured value.
fn narration_max_chars(flag: Option<usize>, config: &Config) -> Result<usize> {
    let max_chars = flag.unwrap_or(config.max_chars);
    anyhow::ensure!(
        max_chars > 0,
        "max_chars must be greater than 0 (set --max-chars or VOXPIPE_MAX_CHARS)"
    );
    Ok(max_chars)
}

fn load_config() -> Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

fn run_split(input: &Path, max_chars: usize, output: &Path, language: &str) -> Result<()> {
    anyhow::ensure!(max_chars > 0, "--max-chars must be greater than 0");

    let splitter = splitter_for_language(language)
        .with_context(|| format!("Unsupported sentence rules: {}", language))?;
    init_default_splitter(splitter);

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let chunks = split_text(&text, max_chars);

    let json = serde_json::to_string_pretty(&chunks)?;
    write_atomic(output, json.as_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Saved {} chunk(s) to {}", chunks.len(), output.display());
    Ok(())
}

fn run_validate(input: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let issues = validate_srt(&text);

    if issues.is_empty() {
        info!("{} is valid SRT", input.display());
        return Ok(());
    }

    for issue in &issues {
        warn!("{}", issue);
    }
    anyhow::bail!("{} is not valid SRT ({} issue(s))", input.display(), issues.len())
}

fn run_check_media(first: &Path, second: &Path) -> Result<()> {
    check_ffprobe()?;

    let left = probe_media(first).with_context(|| format!("Failed to probe {}", first.display()))?;
    let right =
        probe_media(second).with_context(|| format!("Failed to probe {}", second.display()))?;
    info!("{}: {:?}", first.display(), left);
    info!("{}: {:?}", second.display(), right);

    let mismatches = compare_media(&left, &right);
    if mismatches.is_empty() {
        info!("Clips are compatible");
        return Ok(());
    }

    for mismatch in &mismatches {
        warn!("{}", mismatch);
    }
    anyhow::bail!("{} parameter(s) differ", mismatches.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Command::Split {
            input,
            max_chars,
            output,
            language,
        } => run_split(&input, max_chars, &output, &language)?,

        Command::Validate { input } => run_validate(&input)?,

        Command::Translate {
            input,
            language,
            output,
            model,
            source_language,
        } => {
            let config = load_config()?;
            let translator = GeminiTranslator::new(config.api_key()?.to_string())
                .with_model(model.unwrap_or_else(|| config.translate_model.clone()))
                .with_source_language(source_language);

            info!("Model:    {}", translator.model());
            let outcome = translate_file(&translator, &input, &language, output.as_deref()).await?;
            info!(
                "Translated {} block(s) into {}",
                outcome.blocks,
                outcome.output_path.display()
            );
        }

        Command::Tts {
            input,
            text,
            speakers,
            voice,
            temperature,
            output,
            max_chars,
        } => {
            let config = load_config()?;

            let text = match text {
                Some(text) => text,
                None => std::fs::read_to_string(&input)
                    .with_context(|| format!("Failed to read {}", input.display()))?,
            };

            let cancelled = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&cancelled);
            ctrlc::set_handler(move || {
                flag.store(true, Ordering::SeqCst);
            })
            .context("Failed to set Ctrl+C handler")?;

            let speech = GeminiSpeech::new(config.api_key()?.to_string())
                .with_model(config.tts_model.clone())
                .with_voice(voice_selection(speakers, voice, &config))
                .with_temperature(temperature);

            let max_chars = narration_max_chars(max_chars, &config)?;

            let result = narrate(&speech, &text, max_chars, &output, &cancelled, true).await?;
            info!(
                "Wrote {} bytes of {} from {} chunk(s) to {}",
                result.bytes,
                result.mime_type,
                result.chunks,
                result.output_path.display()
            );
        }

        Command::CheckMedia { first, second } => run_check_media(&first, &second)?,
    }

    Ok(())
}
