// Raw PCM to WAV packaging
use crate::error::{Result, VoxpipeError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

const DEFAULT_BITS_PER_SAMPLE: u16 = 16;
const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Sample layout described by an `audio/L16;rate=24000` style MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub bits_per_sample: u16,
    pub sample_rate: u32,
}

/// Read bit depth and sample rate from a MIME type, falling back to
/// 16-bit / 24 kHz for anything missing or unparseable.
pub fn parse_audio_mime_type(mime_type: &str) -> AudioFormat {
    let mut format = AudioFormat {
        bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        sample_rate: DEFAULT_SAMPLE_RATE,
    };

    for param in mime_type.split(';').map(str::trim) {
        if param.to_lowercase().starts_with("rate=") {
            if let Some(Ok(rate)) = param.split_once('=').map(|(_, v)| v.trim().parse()) {
                format.sample_rate = rate;
            }
        } else if let Some(bits) = param.strip_prefix("audio/L") {
            if let Ok(bits) = bits.parse() {
                format.bits_per_sample = bits;
            }
        }
    }

    format
}

/// File extension for container formats that can be written as-is.
///
/// Returns `None` for raw PCM, which needs a WAV header.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let base = mime_type.split(';').next().unwrap_or("").trim().to_lowercase();
    match base.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/ogg" => Some("ogg"),
        "audio/flac" => Some("flac"),
        "audio/aac" => Some("aac"),
        "audio/mp4" => Some("m4a"),
        _ => None,
    }
}

pub fn is_raw_pcm(mime_type: &str) -> bool {
    extension_for_mime(mime_type).is_none()
}

/// Wrap little-endian mono PCM in a RIFF/WAVE container.
pub fn pcm_to_wav(data: &[u8], mime_type: &str) -> Result<Vec<u8>> {
    let format = parse_audio_mime_type(mime_type);
    let spec = WavSpec {
        channels: 1,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let bytes_per_sample = match format.bits_per_sample {
        8 | 16 | 24 | 32 => usize::from(format.bits_per_sample / 8),
        other => {
            return Err(VoxpipeError::Audio(format!(
                "unsupported PCM bit depth: {}",
                other
            )))
        }
    };

    let samples = data.chunks_exact(bytes_per_sample);
    if !samples.remainder().is_empty() {
        debug!(
            "Dropping {} trailing byte(s) of an incomplete sample",
            samples.remainder().len()
        );
    }

    let mut cursor = Cursor::new(Vec::with_capacity(data.len() + 44));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in samples {
            match sample {
                [b] => writer.write_sample((i16::from(*b) - 128) as i8)?,
                [lo, hi] => writer.write_sample(i16::from_le_bytes([*lo, *hi]))?,
                [b0, b1, b2] => {
                    // Sign-extend 24-bit little-endian
                    let value = i32::from_le_bytes([0, *b0, *b1, *b2]) >> 8;
                    writer.write_sample(value)?
                }
                [b0, b1, b2, b3] => writer.write_sample(i32::from_le_bytes([*b0, *b1, *b2, *b3]))?,
                _ => unreachable!("chunks_exact yields {bytes_per_sample}-byte slices"),
            }
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Join complete WAV files into one by decoding and re-encoding their
/// samples. All inputs must share the same channel count, sample rate, bit
/// depth and sample format.
pub fn concat_wav(clips: &[Vec<u8>]) -> Result<Vec<u8>> {
    let Some((first, rest)) = clips.split_first() else {
        return Err(VoxpipeError::Audio("no audio to join".to_string()));
    };
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let spec = WavReader::new(Cursor::new(first.as_slice()))?.spec();
    let total: usize = clips.iter().map(Vec::len).sum();
    let mut cursor = Cursor::new(Vec::with_capacity(total));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for (i, clip) in clips.iter().enumerate() {
            let reader = WavReader::new(Cursor::new(clip.as_slice()))?;
            if reader.spec() != spec {
                return Err(VoxpipeError::Audio(format!(
                    "WAV chunk {} has format {:?}, expected {:?}",
                    i + 1,
                    reader.spec(),
                    spec
                )));
            }
            match spec.sample_format {
                SampleFormat::Int => {
                    for sample in reader.into_samples::<i32>() {
                        writer.write_sample(sample?)?;
                    }
                }
                SampleFormat::Float => {
                    for sample in reader.into_samples::<f32>() {
                        writer.write_sample(sample?)?;
                    }
                }
            }
        }
        writer.finalize()?;
    }

    debug!("Joined {} WAV chunks", clips.len());
    Ok(cursor.into_inner())
}
