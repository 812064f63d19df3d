//! Default sentence detection backed by the `seams` dialog-aware detector.

use super::sentence::{RuleSplitter, SentenceSplitter};
use seams::sentence_detector::dialog_detector::SentenceDetectorDialog;
use std::sync::OnceLock;
use tracing::{debug, warn};

static DETECTOR: OnceLock<Option<SentenceDetectorDialog>> = OnceLock::new();

fn detector() -> Option<&'static SentenceDetectorDialog> {
    DETECTOR
        .get_or_init(|| match SentenceDetectorDialog::new() {
            Ok(detector) => Some(detector),
            Err(e) => {
                warn!("Sentence detector unavailable, using rule-based splitting: {:?}", e);
                None
            }
        })
        .as_ref()
}

/// Splitter that asks `seams` for boundaries and returns exact slices of
/// the input.
///
/// The detector's sentences are mapped back onto the source text by their
/// non-whitespace characters. A boundary is kept only where whitespace or
/// the end of the text follows it. If the detector fails or rewrites any
/// character, the English [`RuleSplitter`] is used instead.
#[derive(Debug, Clone, Default)]
pub struct SeamsSplitter {
    fallback: RuleSplitter,
}

impl SeamsSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: RuleSplitter) -> Self {
        Self { fallback }
    }
}

impl SentenceSplitter for SeamsSplitter {
    fn split_sentences(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let Some(detector) = detector() else {
            return self.fallback.split_sentences(text);
        };

        let detected: Vec<String> = match detector.detect_sentences_borrowed(text) {
            Ok(sentences) => sentences.iter().map(|s| s.normalize()).collect(),
            Err(e) => {
                debug!("Sentence detection failed, using rules: {:?}", e);
                return self.fallback.split_sentences(text);
            }
        };

        align_to_source(text, &detected).unwrap_or_else(|| {
            debug!("Detected sentences do not match the input, using rules");
            self.fallback.split_sentences(text)
        })
    }
}

/// Cut `text` where the detected sentences end.
///
/// Returns `None` when a detected sentence's characters differ from the
/// source. Source text left over after the last detected sentence becomes
/// a final sentence of its own.
fn align_to_source(text: &str, detected: &[String]) -> Option<Vec<String>> {
    let mut source = text.char_indices().filter(|(_, c)| !c.is_whitespace());
    let mut sentences = Vec::new();
    let mut start = 0;

    for sentence in detected {
        let mut end = None;
        for expected in sentence.chars().filter(|c| !c.is_whitespace()) {
            let (pos, c) = source.next()?;
            if c != expected {
                return None;
            }
            end = Some(pos + c.len_utf8());
        }

        let Some(end) = end else { continue };
        let at_boundary = text[end..].chars().next().map_or(true, char::is_whitespace);
        if at_boundary {
            let piece = text[start..end].trim();
            if !piece.is_empty() {
                sentences.push(piece.to_string());
            }
            start = end;
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    Some(sentences)
}
