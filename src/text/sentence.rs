//! Rule-based sentence boundary detection.
//!
//! Segmentation is pluggable through [`SentenceSplitter`]. The bundled
//! [`RuleSplitter`] works from a [`SentenceRules`] locale ruleset: a set of
//! terminators that must be followed by whitespace (Latin scripts), a set
//! that ends a sentence on its own (CJK full-width punctuation), trailing
//! closers that stay attached to the sentence, and known abbreviations.
//! The process default is the `seams`-backed [`SeamsSplitter`], which falls
//! back to the English rules.

use super::detector::SeamsSplitter;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// Splits text into an ordered sequence of sentences.
///
/// Implementations must return sentences in input order without dropping or
/// reordering characters, apart from the whitespace between sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split_sentences(&self, text: &str) -> Vec<String>;
}

const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "e.g", "i.e", "inc", "ltd", "corp",
    "mt", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    "approx", "dept", "est", "gen", "gov", "lt", "col", "sgt", "capt", "rev", "hon", "u.s", "a.m",
    "p.m",
];

const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}', '\u{300D}', '\u{300F}'];

/// Locale-specific boundary rules.
#[derive(Debug, Clone)]
pub struct SentenceRules {
    /// Terminators that end a sentence only before whitespace or end of text.
    spaced_terminators: Vec<char>,
    /// Terminators that end a sentence wherever they appear.
    unspaced_terminators: Vec<char>,
    closers: Vec<char>,
    abbreviations: HashSet<String>,
}

impl SentenceRules {
    pub fn new(terminators: impl IntoIterator<Item = char>) -> Self {
        Self {
            spaced_terminators: terminators.into_iter().collect(),
            unspaced_terminators: Vec::new(),
            closers: CLOSERS.to_vec(),
            abbreviations: HashSet::new(),
        }
    }

    /// English: `.`, `!`, `?` with common abbreviations.
    pub fn english() -> Self {
        Self::new(['.', '!', '?']).with_abbreviations(ENGLISH_ABBREVIATIONS.iter().copied())
    }

    /// Chinese/Japanese: full-width terminators plus the Latin ones for
    /// mixed-script text.
    pub fn cjk() -> Self {
        Self::new(['.', '!', '?']).with_unspaced_terminators(['。', '！', '？'])
    }

    /// Rules for a language code, if one is bundled.
    pub fn for_language(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "en" | "english" => Some(Self::english()),
            "zh" | "ja" | "chinese" | "japanese" => Some(Self::cjk()),
            _ => None,
        }
    }

    pub fn with_abbreviations<'a>(mut self, abbreviations: impl IntoIterator<Item = &'a str>) -> Self {
        self.abbreviations
            .extend(abbreviations.into_iter().map(|a| a.trim_end_matches('.').to_lowercase()));
        self
    }

    pub fn with_unspaced_terminators(mut self, terminators: impl IntoIterator<Item = char>) -> Self {
        self.unspaced_terminators.extend(terminators);
        self
    }

    fn is_terminator(&self, c: char) -> bool {
        self.spaced_terminators.contains(&c) || self.unspaced_terminators.contains(&c)
    }

    fn is_abbreviation(&self, token: &str) -> bool {
        let token = token
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim_end_matches('.')
            .to_lowercase();
        self.abbreviations.contains(&token)
    }
}

impl Default for SentenceRules {
    fn default() -> Self {
        Self::english()
    }
}

/// Splitter driven by a [`SentenceRules`] ruleset.
#[derive(Debug, Clone, Default)]
pub struct RuleSplitter {
    rules: SentenceRules,
}

impl RuleSplitter {
    pub fn new(rules: SentenceRules) -> Self {
        Self { rules }
    }

    /// A lone `.` after a known abbreviation does not end a sentence.
    fn ends_sentence(&self, token: Option<&str>) -> bool {
        !token.is_some_and(|t| self.rules.is_abbreviation(t))
    }
}

impl SentenceSplitter for RuleSplitter {
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (pos, c) = chars[i];
            if !self.rules.is_terminator(c) {
                i += 1;
                continue;
            }

            // Absorb runs like "?!" or "..." and any closing quotes/brackets
            let mut term_end = i + 1;
            while term_end < chars.len() && self.rules.is_terminator(chars[term_end].1) {
                term_end += 1;
            }
            let mut j = term_end;
            while j < chars.len() && self.rules.closers.contains(&chars[j].1) {
                j += 1;
            }
            let end = chars.get(j).map(|(p, _)| *p).unwrap_or(text.len());
            let at_end = j >= chars.len();

            let is_boundary = if self.rules.unspaced_terminators.contains(&c) {
                true
            } else if !at_end && !chars[j].1.is_whitespace() {
                false
            } else {
                let token = (c == '.' && term_end - i == 1).then(|| {
                    let word = text[start..pos].rsplit(char::is_whitespace).next().unwrap_or("");
                    format!("{word}.")
                });
                self.ends_sentence(token.as_deref())
            };

            if is_boundary {
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = end;
            }
            i = j;
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }

        sentences
    }
}

/// Splitter for a language code: the `seams` detector for English, bundled
/// rules for Chinese and Japanese.
pub fn splitter_for_language(code: &str) -> Option<Box<dyn SentenceSplitter>> {
    match code.to_lowercase().as_str() {
        "en" | "english" => Some(Box::new(SeamsSplitter::new())),
        other => SentenceRules::for_language(other)
            .map(|rules| Box::new(RuleSplitter::new(rules)) as Box<dyn SentenceSplitter>),
    }
}

static DEFAULT_SPLITTER: OnceLock<Box<dyn SentenceSplitter>> = OnceLock::new();

/// Install the process-wide default splitter.
///
/// Returns `true` if this call performed the initialization, `false` if a
/// default was already in place (the existing one is kept).
pub fn init_default_splitter(splitter: Box<dyn SentenceSplitter>) -> bool {
    let installed = DEFAULT_SPLITTER.set(splitter).is_ok();
    if installed {
        debug!("Default sentence splitter initialized");
    }
    installed
}

/// The process-wide default splitter, [`SeamsSplitter`] unless initialized
/// otherwise.
pub fn default_splitter() -> &'static dyn SentenceSplitter {
    DEFAULT_SPLITTER
        .get_or_init(|| {
            debug!("Default sentence splitter initialized with the seams detector");
            let splitter: Box<dyn SentenceSplitter> = Box::new(SeamsSplitter::new());
            splitter
        })
        .as_ref()
}
