use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::segmenter::{SentenceSegmenter, UnicodeSegmenter};
use crate::types::{Chunk, ChunkMetadata};

/// Leading tokens a sentence splitter mistakes for a new sentence when they
/// follow an abbreviation-like period ("Node.js", "Deno.ts" and friends).
static TECH_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(js|ts|jsx|tsx)\b").expect("tech token pattern is valid"));

/// Main chunker interface for threading text
pub struct Chunker {
    config: ChunkerConfig,
    segmenter: Arc<dyn SentenceSegmenter>,
}

/// Accumulated chunk text awaiting post-processing
struct Draft {
    text: String,
    forced: bool,
}

impl Chunker {
    /// Create a chunker with the default Unicode sentence segmenter
    #[must_use]
    pub fn new(config: ChunkerConfig) -> Self {
        Self::with_segmenter(config, Arc::new(UnicodeSegmenter))
    }

    /// Create a chunker with a custom sentence segmenter
    #[must_use]
    pub fn with_segmenter(config: ChunkerConfig, segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        config
            .validate()
            .expect("Invalid chunker configuration provided");
        Self { config, segmenter }
    }

    /// Segment text into ordered, bounded chunks.
    ///
    /// Paragraphs are split on line breaks, decomposed into sentences, and
    /// packed into chunks of at most `max_chunk_chars` characters, breaking at
    /// sentence boundaries where possible and at word boundaries otherwise.
    /// Empty input yields an empty sequence.
    pub fn chunk_str(&self, text: &str) -> Result<Vec<Chunk>> {
        let mut drafts: Vec<Draft> = Vec::new();
        let mut current = String::new();

        for paragraph in split_paragraphs(text) {
            let mut sentences = self.segmenter.sentences(paragraph);
            merge_false_splits(&mut sentences);

            for sentence in &sentences {
                self.place_sentence(sentence, &mut current, &mut drafts)?;
            }
        }

        if !current.trim().is_empty() {
            drafts.push(Draft {
                text: current,
                forced: false,
            });
        }

        Ok(finalize(drafts))
    }

    /// Segment text and render it as a numbered thread.
    ///
    /// A single post is rendered bare; longer threads prefix every post with
    /// `"{index+1}/{total} "`.
    pub fn thread(&self, text: &str) -> Result<Vec<String>> {
        let chunks = self.chunk_str(text)?;
        let total = chunks.len();
        Ok(chunks.iter().map(|chunk| chunk.numbered(total)).collect())
    }

    /// Place one sentence into the accumulator, flushing and force-splitting
    /// as needed.
    ///
    /// The unconsumed remainder of a forced split becomes the new pending
    /// text; the loop drains the cursor until nothing is left.
    fn place_sentence(
        &self,
        sentence: &str,
        current: &mut String,
        drafts: &mut Vec<Draft>,
    ) -> Result<()> {
        let mut pending = sentence.to_string();

        while !pending.trim().is_empty() {
            // Flush a nearly-full accumulator before appending, even when the
            // pending text would still fit.
            if char_len(current) > self.config.soft_flush_chars {
                drafts.push(Draft {
                    text: std::mem::take(current),
                    forced: false,
                });
            }

            let candidate = if current.is_empty() {
                pending.clone()
            } else {
                format!("{current}\n\n{pending}")
            };

            if char_len(&candidate) <= self.config.max_chunk_chars {
                *current = candidate.trim().to_string();
                break;
            }

            pending = self.force_split(&pending, current, drafts)?;
        }

        Ok(())
    }

    /// Cut a word-level prefix out of `pending`, emit it as a truncated
    /// draft, and return the unconsumed remainder.
    fn force_split(
        &self,
        pending: &str,
        current: &mut String,
        drafts: &mut Vec<Draft>,
    ) -> Result<String> {
        let budget = self.config.forced_split_budget();

        let mut prefix = if current.is_empty() {
            String::new()
        } else {
            format!("{current}\n\n")
        };
        let mut remainder = String::new();
        let mut overflowed = false;

        for token in pending.split(' ') {
            // Once the budget is first reached, every later token goes to the
            // remainder unconditionally, even if a shorter one would still fit.
            if !overflowed && char_len(&prefix) + char_len(token) + 1 < budget {
                prefix.push_str(token);
                prefix.push(' ');
            } else {
                overflowed = true;
                remainder.push_str(token);
                remainder.push(' ');
            }
        }

        current.clear();

        let prefix = prefix.trim();
        if prefix.is_empty() {
            // A single token wider than the whole budget: cut the token at the
            // budget boundary and carry the rest of the sentence forward.
            let pending = pending.trim_start();
            let head = truncate_chars(first_token(pending), budget);
            let tail = &pending[head.len()..];
            drafts.push(self.truncated_draft(head.to_string())?);
            return Ok(tail.to_string());
        }

        drafts.push(self.truncated_draft(prefix.to_string())?);
        Ok(remainder)
    }

    /// Finish a forced-split draft with the continuation marker, enforcing
    /// the hard length bound.
    fn truncated_draft(&self, text: String) -> Result<Draft> {
        let mut text = text.trim().to_string();
        text.push_str(&self.config.continuation_marker);

        let len = char_len(&text);
        let limit = self.config.max_chunk_chars;
        if len > limit {
            // Unreachable while the split budget reserves the marker.
            log::error!("forced split produced a {len} char chunk over the {limit} char limit");
            return Err(ChunkerError::ChunkOverflow { len, limit });
        }

        Ok(Draft { text, forced: true })
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Summarize a chunked thread
    #[must_use]
    pub fn stats(chunks: &[Chunk]) -> ThreadStats {
        ThreadStats {
            total_chunks: chunks.len(),
            total_chars: chunks.iter().map(Chunk::char_count).sum(),
            avg_chars_per_chunk: if chunks.is_empty() {
                0
            } else {
                chunks.iter().map(Chunk::char_count).sum::<usize>() / chunks.len()
            },
            min_chars: chunks.iter().map(Chunk::char_count).min().unwrap_or(0),
            max_chars: chunks.iter().map(Chunk::char_count).max().unwrap_or(0),
            forced_splits: chunks.iter().filter(|c| c.is_forced_split()).count(),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

/// Statistics about a chunked thread
#[derive(Debug, Clone)]
pub struct ThreadStats {
    pub total_chunks: usize,
    pub total_chars: usize,
    pub avg_chars_per_chunk: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub forced_splits: usize,
}

impl std::fmt::Display for ThreadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Chars: {} | Avg: {} | Range: {}-{} | Forced: {}",
            self.total_chunks,
            self.total_chars,
            self.avg_chars_per_chunk,
            self.min_chars,
            self.max_chars,
            self.forced_splits
        )
    }
}

/// Split a document into ordered, non-empty, trimmed paragraphs
fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|p| !p.is_empty())
}

/// Repair sentence splits the segmenter gets wrong: an abbreviation-like
/// period followed by a short technical token is one sentence, not two.
///
/// Single left-to-right pass with in-place compaction over a fixed 4-token
/// vocabulary; a merged sentence is re-checked against its new neighbor, but
/// the list is never re-scanned from the start.
fn merge_false_splits(sentences: &mut Vec<String>) {
    let mut i = 0;
    while i + 1 < sentences.len() {
        if sentences[i].ends_with('.') && TECH_TOKEN.is_match(&sentences[i + 1]) {
            let next = sentences.remove(i + 1);
            sentences[i].push_str(&next);
        } else {
            i += 1;
        }
    }
}

/// Trim, drop empties, and wrap surviving drafts as ordered chunks
fn finalize(drafts: Vec<Draft>) -> Vec<Chunk> {
    drafts
        .into_iter()
        .filter_map(|draft| {
            let content = draft.text.trim().to_string();
            if content.is_empty() {
                return None;
            }
            let metadata = ChunkMetadata {
                char_count: char_len(&content),
                forced_split: draft.forced,
            };
            Some((content, metadata))
        })
        .enumerate()
        .map(|(index, (content, metadata))| Chunk::new(index, content, metadata))
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn first_token(s: &str) -> &str {
    s.split(' ').next().unwrap_or(s)
}

/// Byte-safe prefix of at most `n` characters
fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Deterministic segmenter for tests: sentences are '|'-separated
    struct PipeSegmenter;

    impl SentenceSegmenter for PipeSegmenter {
        fn sentences(&self, paragraph: &str) -> Vec<String> {
            paragraph
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }
    }

    fn scripted_chunker() -> Chunker {
        Chunker::with_segmenter(ChunkerConfig::default(), Arc::new(PipeSegmenter))
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = Chunker::default();
        assert!(chunker.chunk_str("").unwrap().is_empty());
        assert!(chunker.chunk_str("  \n \n  ").unwrap().is_empty());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk_str("Hello world.").unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.");
        assert!(!chunks[0].is_forced_split());
    }

    #[test]
    fn test_paragraphs_are_trimmed_and_joined_with_blank_line() {
        let chunker = Chunker::default();
        let chunks = chunker
            .chunk_str("  First paragraph here.  \n\n  Second paragraph here.  ")
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].content,
            "First paragraph here.\n\nSecond paragraph here."
        );
    }

    #[test]
    fn test_soft_flush_fires_before_append() {
        // 210 chars in the accumulator, then a 10 char sentence: the combined
        // 222 would fit under 250, but the soft threshold flushes first.
        let long = "a".repeat(210);
        let input = format!("{long}|ten chars.");

        let chunks = scripted_chunker().chunk_str(&input).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, long);
        assert_eq!(chunks[1].content, "ten chars.");
    }

    #[test]
    fn test_sentences_pack_until_soft_threshold() {
        // Three 100-char sentences: the first two pack into one 202-char
        // chunk, which is past the soft threshold, so the third starts fresh.
        let s = "b".repeat(100);
        let input = format!("{s}|{s}|{s}");

        let chunks = scripted_chunker().chunk_str(&input).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, format!("{s}\n\n{s}"));
        assert_eq!(chunks[1].content, s);
    }

    #[test]
    fn test_forced_split_breaks_at_word_boundary() {
        // 26 ten-char words: 285 chars total forces a word-level split.
        let words: Vec<String> = (0..26).map(|i| format!("word{i:05}x")).collect();
        let sentence = words.join(" ");

        let chunks = scripted_chunker().chunk_str(&sentence).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].is_forced_split());
        assert!(chunks[0].content.ends_with("..."));
        assert!(chunks[0].char_count() <= 250);
        assert!(!chunks[1].is_forced_split());

        // No word is cut in half across the boundary.
        let first = chunks[0].content.trim_end_matches("...");
        let last_kept = first.split(' ').last().unwrap();
        let first_moved = chunks[1].content.split(' ').next().unwrap();
        assert!(words.contains(&last_kept.to_string()));
        assert!(words.contains(&first_moved.to_string()));
    }

    #[test]
    fn test_oversized_token_is_hard_truncated() {
        let token = "x".repeat(400);

        let chunks = scripted_chunker().chunk_str(&token).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].char_count(), 250);
        assert!(chunks[0].content.ends_with("..."));
        assert_eq!(chunks[1].content, "x".repeat(153));
    }

    #[test]
    fn test_forced_split_keeps_accumulated_text_first() {
        // A half-full accumulator followed by an unsplittable token: the
        // accumulated text is emitted with the marker, then the token is
        // truncated on its own.
        let lead = "c".repeat(100);
        let token = "y".repeat(300);
        let input = format!("{lead}|{token}");

        let chunks = scripted_chunker().chunk_str(&input).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, format!("{lead}..."));
        assert!(chunks[0].is_forced_split());
        assert_eq!(chunks[1].char_count(), 250);
        assert_eq!(chunks[2].content, "y".repeat(53));
    }

    #[test]
    fn test_merge_false_splits_joins_tech_tokens() {
        let mut sentences = vec![
            "Check out the Node.".to_string(),
            "js library for this.".to_string(),
        ];
        merge_false_splits(&mut sentences);
        assert_eq!(sentences, vec!["Check out the Node.js library for this."]);
    }

    #[test]
    fn test_merge_false_splits_rechecks_merged_neighbor() {
        let mut sentences = vec![
            "Works in Node.".to_string(),
            "js and Deno.".to_string(),
            "ts runtimes.".to_string(),
        ];
        merge_false_splits(&mut sentences);
        assert_eq!(sentences, vec!["Works in Node.js and Deno.ts runtimes."]);
    }

    #[test]
    fn test_merge_false_splits_requires_period_and_boundary() {
        // No trailing period on the first sentence
        let mut sentences = vec!["No period here".to_string(), "js next.".to_string()];
        merge_false_splits(&mut sentences);
        assert_eq!(sentences.len(), 2);

        // "json" is not in the token vocabulary ("js" needs a word boundary)
        let mut sentences = vec!["Parse it.".to_string(), "json is fine.".to_string()];
        merge_false_splits(&mut sentences);
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_thread_numbering() {
        let chunker = scripted_chunker();

        let single = chunker.thread("Just one post.").unwrap();
        assert_eq!(single, vec!["Just one post.".to_string()]);

        let long = "d".repeat(210);
        let multi = chunker.thread(&format!("{long}|second post.")).unwrap();
        assert_eq!(multi.len(), 2);
        assert_eq!(multi[0], format!("1/2 {long}"));
        assert_eq!(multi[1], "2/2 second post.");
    }

    #[test]
    fn test_stats() {
        let chunker = scripted_chunker();
        let long = "e".repeat(210);
        let chunks = chunker
            .chunk_str(&format!("{long}|short one."))
            .unwrap();

        let stats = Chunker::stats(&chunks);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.total_chars, 220);
        assert_eq!(stats.min_chars, 10);
        assert_eq!(stats.max_chars, 210);
        assert_eq!(stats.forced_splits, 0);
        assert_eq!(format!("{stats}"), "Chunks: 2 | Chars: 220 | Avg: 110 | Range: 10-210 | Forced: 0");
    }

    #[test]
    fn test_custom_limits() {
        let config = ChunkerConfig::for_sms();
        let chunker = Chunker::with_segmenter(config, Arc::new(PipeSegmenter));

        let long = "f".repeat(140);
        let chunks = chunker.chunk_str(&format!("{long}|tail.")).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.char_count() <= 160));
    }

    #[test]
    #[should_panic(expected = "Invalid chunker configuration")]
    fn test_invalid_config_rejected_at_construction() {
        let config = ChunkerConfig {
            soft_flush_chars: 300,
            ..Default::default()
        };
        let _ = Chunker::new(config);
    }
}
