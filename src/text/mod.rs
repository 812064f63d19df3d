//! Text preparation for speech synthesis: normalization, sentence
//! detection and length-bounded chunking.

pub mod detector;
pub mod normalize;
pub mod segment;
pub mod sentence;

pub use detector::SeamsSplitter;
pub use normalize::normalize;
pub use segment::{split_text, split_text_with};
pub use sentence::{
    default_splitter, init_default_splitter, splitter_for_language, RuleSplitter, SentenceRules,
    SentenceSplitter,
};
