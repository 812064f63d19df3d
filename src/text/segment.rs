use super::normalize::normalize;
use super::sentence::{default_splitter, SentenceSplitter};
use tracing::debug;

/// Split text into chunks of at most `max_chars` characters without
/// breaking a sentence, using the process-wide default splitter.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    split_text_with(default_splitter(), text, max_chars)
}

/// Split text into chunks using the given sentence splitter.
///
/// Sentences are packed greedily in order: each one joins the current chunk
/// (separated by a single space) while the chunk stays within `max_chars`
/// characters, otherwise the chunk is flushed and a new one started. A
/// sentence longer than `max_chars` on its own becomes its own chunk.
pub fn split_text_with<S>(splitter: &S, text: &str, max_chars: usize) -> Vec<String>
where
    S: SentenceSplitter + ?Sized,
{
    let text = normalize(text);
    if text.is_empty() {
        return Vec::new();
    }

    let sentences = splitter.split_sentences(&text);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences {
        let sentence_len = sentence.chars().count();
        let candidate_len = if current.is_empty() {
            sentence_len
        } else {
            current_len + 1 + sentence_len
        };

        if candidate_len <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
            current_len = candidate_len;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if sentence_len > max_chars {
                debug!(
                    "Sentence of {} chars exceeds limit of {}, keeping it whole",
                    sentence_len, max_chars
                );
            }
            current = sentence;
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
