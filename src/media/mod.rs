//! Media compatibility checks for concatenating clips.

pub mod probe;

pub use probe::{check_ffprobe, parse_frame_rate, parse_media_info, probe_media};

use std::fmt;

/// Stream parameters that must agree for a lossless concat.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// `None` when the file has no audio stream.
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: &'static str,
    pub left: String,
    pub right: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} vs {}", self.field, self.left, self.right)
    }
}

fn show<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

/// List every field that differs between two files. Empty means compatible.
pub fn compare_media(left: &MediaInfo, right: &MediaInfo) -> Vec<Mismatch> {
    let fields = [
        ("width", left.width.to_string(), right.width.to_string()),
        ("height", left.height.to_string(), right.height.to_string()),
        ("fps", format!("{:.3}", left.fps), format!("{:.3}", right.fps)),
        ("sample_rate", show(left.sample_rate), show(right.sample_rate)),
        ("channels", show(left.channels), show(right.channels)),
    ];

    fields
        .into_iter()
        .filter(|(_, l, r)| l != r)
        .map(|(field, left, right)| Mismatch { field, left, right })
        .collect()
}
