pub mod srt;
pub mod validate;

pub use srt::{compare_structure, format_timestamp, parse_srt, parse_timestamp};
pub use validate::{is_valid_srt, validate_srt, BlockIssue, IssueKind};

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}
