use unicode_segmentation::UnicodeSegmentation;

/// Sentence boundary detection consumed by the chunker.
///
/// Implementations return trimmed sentences in source order; concatenating
/// them reconstructs the paragraph up to whitespace differences. A segmenter
/// is initialized once per process and shared across calls, so it must be
/// safe for concurrent reads.
pub trait SentenceSegmenter: Send + Sync {
    /// Split a paragraph into an ordered sequence of sentences
    fn sentences(&self, paragraph: &str) -> Vec<String>;
}

/// Default segmenter backed by UAX #29 sentence boundaries
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl SentenceSegmenter for UnicodeSegmenter {
    fn sentences(&self, paragraph: &str) -> Vec<String> {
        paragraph
            .unicode_sentences()
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .map(str::to_string)
            .collect()
    }
}
