//! Structural validation of SRT documents.
//!
//! The checks are purely syntactic: an index line of decimal digits, a
//! `HH:MM:SS,mmm --> HH:MM:SS,mmm` timecode line and at least one non-blank
//! text line per block. Digits are any Unicode decimal digit, so full-width
//! or Arabic-Indic numerals pass. Timecode ranges, ordering and index
//! uniqueness are not checked.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("Invalid regex"));

/// Line boundaries: `\r\n`, `\n`, `\r` and the other Unicode line and
/// record separators.
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|[\n\r\x0B\x0C\x1C\x1D\x1E\x{85}\x{2028}\x{2029}]").expect("Invalid regex")
});

static INDEX_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("Invalid regex"));

pub(crate) static TIMECODE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2},\d{3}) --> (\d{2}:\d{2}:\d{2},\d{3})$")
        .expect("Invalid regex")
});

/// Why a block failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The document is empty or contains no blocks.
    EmptyDocument,
    /// The block has fewer than two lines.
    TooFewLines,
    /// The first line is not an unsigned integer.
    BadIndex(String),
    /// The second line is not a timecode pair.
    BadTimecode(String),
    /// No non-blank line follows the timecode.
    MissingText,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::EmptyDocument => write!(f, "document has no subtitle blocks"),
            IssueKind::TooFewLines => write!(f, "block has fewer than 2 lines"),
            IssueKind::BadIndex(line) => write!(f, "index line is not a number: {:?}", line),
            IssueKind::BadTimecode(line) => write!(f, "malformed timecode line: {:?}", line),
            IssueKind::MissingText => write!(f, "block has no subtitle text"),
        }
    }
}

/// A validation failure tied to a 1-based block number.
///
/// `block` is 0 for document-level issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIssue {
    pub block: usize,
    pub kind: IssueKind,
}

impl fmt::Display for BlockIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.block == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "block {}: {}", self.block, self.kind)
        }
    }
}

/// Split a trimmed document into its non-empty blocks.
pub(crate) fn split_blocks(text: &str) -> Vec<&str> {
    BLOCK_SEPARATOR
        .split(text.trim())
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect()
}

/// Split a block into lines on any line boundary. A trailing boundary does
/// not produce an empty last line.
pub(crate) fn split_lines(block: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BREAK.split(block).collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

fn check_block(block: &str) -> Option<IssueKind> {
    let lines = split_lines(block);
    if lines.len() < 2 {
        return Some(IssueKind::TooFewLines);
    }

    let index = lines[0].trim();
    if !INDEX_LINE.is_match(index) {
        return Some(IssueKind::BadIndex(index.to_string()));
    }

    let timecode = lines[1].trim();
    if !TIMECODE_LINE.is_match(timecode) {
        return Some(IssueKind::BadTimecode(timecode.to_string()));
    }

    if !lines[2..].iter().any(|l| !l.trim().is_empty()) {
        return Some(IssueKind::MissingText);
    }

    None
}

/// Report every block that does not look like SRT.
///
/// An empty result means the document is valid.
pub fn validate_srt(text: &str) -> Vec<BlockIssue> {
    let blocks = split_blocks(text);
    if blocks.is_empty() {
        return vec![BlockIssue {
            block: 0,
            kind: IssueKind::EmptyDocument,
        }];
    }

    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            check_block(block).map(|kind| BlockIssue { block: i + 1, kind })
        })
        .collect()
}

/// Check that `text` has the basic shape of an SRT document.
pub fn is_valid_srt(text: &str) -> bool {
    let blocks = split_blocks(text);
    !blocks.is_empty() && blocks.iter().all(|b| check_block(b).is_none())
}
