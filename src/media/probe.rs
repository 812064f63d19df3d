use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{Result, VoxpipeError};

use super::MediaInfo;

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe")
        .arg("-version")
        .output()
        .map_err(|e| {
            VoxpipeError::Media(format!(
                "FFprobe not found. Please install FFmpeg (includes FFprobe). Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(VoxpipeError::Media("FFprobe check failed".to_string()));
    }

    debug!("FFprobe is available");
    Ok(())
}

/// Parse an FFprobe rational frame rate such as `30000/1001` or `25`.
pub fn parse_frame_rate(s: &str) -> Result<f64> {
    let s = s.trim();
    let invalid = || VoxpipeError::Media(format!("Failed to parse frame rate '{}'", s));

    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| invalid())?;
            let den: f64 = den.trim().parse().map_err(|_| invalid())?;
            if den == 0.0 {
                return Err(invalid());
            }
            Ok(num / den)
        }
        None => s.parse().map_err(|_| invalid()),
    }
}

/// Parse `key=value` lines from `-of default=noprint_wrappers=1`.
fn parse_key_values(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn run_ffprobe(input: &Path, stream: &str, entries: &str) -> Result<Option<String>> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            stream,
            "-show_entries",
            entries,
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(input)
        .output()
        .map_err(|e| VoxpipeError::Media(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("FFprobe {} failed: {}", stream, stderr.trim());
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!stdout.is_empty()).then_some(stdout))
}

/// Build [`MediaInfo`] from FFprobe's video and (optional) audio output.
pub fn parse_media_info(video: &str, audio: Option<&str>) -> Result<MediaInfo> {
    let video = parse_key_values(video);
    let field = |name: &str| {
        video
            .get(name)
            .ok_or_else(|| VoxpipeError::Media(format!("FFprobe output missing {}", name)))
    };

    let width: u32 = field("width")?
        .parse()
        .map_err(|e| VoxpipeError::Media(format!("Failed to parse width: {e}")))?;
    let height: u32 = field("height")?
        .parse()
        .map_err(|e| VoxpipeError::Media(format!("Failed to parse height: {e}")))?;
    let fps = parse_frame_rate(field("r_frame_rate")?)?;

    let audio = audio.map(parse_key_values).unwrap_or_default();
    let sample_rate = audio.get("sample_rate").and_then(|v| v.parse().ok());
    let channels = audio.get("channels").and_then(|v| v.parse().ok());

    Ok(MediaInfo {
        width,
        height,
        fps,
        sample_rate,
        channels,
    })
}

/// Probe the first video and audio stream of a media file.
///
/// A missing audio stream is not an error; its fields are `None`.
pub fn probe_media(input: &Path) -> Result<MediaInfo> {
    if !input.exists() {
        return Err(VoxpipeError::FileNotFound(input.display().to_string()));
    }

    let video = run_ffprobe(input, "v:0", "stream=width,height,r_frame_rate")?.ok_or_else(|| {
        VoxpipeError::Media(format!("No video stream found in {}", input.display()))
    })?;
    let audio = run_ffprobe(input, "a:0", "stream=sample_rate,channels")?;

    let info = parse_media_info(&video, audio.as_deref())?;
    debug!("Probed {}: {:?}", input.display(), info);
    Ok(info)
}
