use serde::{Deserialize, Serialize};

/// A finalized thread chunk with metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the thread (0-indexed)
    pub index: usize,

    /// The chunk text, trimmed, without any numbering prefix
    pub content: String,

    /// Metadata about this chunk
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk
    #[must_use]
    pub const fn new(index: usize, content: String, metadata: ChunkMetadata) -> Self {
        Self {
            index,
            content,
            metadata,
        }
    }

    /// Get the content length in characters
    #[must_use]
    pub const fn char_count(&self) -> usize {
        self.metadata.char_count
    }

    /// Check whether this chunk was cut mid-sentence at a word boundary
    #[must_use]
    pub const fn is_forced_split(&self) -> bool {
        self.metadata.forced_split
    }

    /// Render the chunk for a thread of `total` posts.
    ///
    /// Threads longer than one post get a `"{index+1}/{total} "` prefix; a
    /// single post is rendered bare.
    #[must_use]
    pub fn numbered(&self, total: usize) -> String {
        if total > 1 {
            format!("{}/{} {}", self.index + 1, total, self.content)
        } else {
            self.content.clone()
        }
    }
}

/// Metadata about a thread chunk
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Content length in characters (Unicode scalar values)
    pub char_count: usize,

    /// Chunk ends in a forced word-level split and carries the continuation
    /// marker
    pub forced_split: bool,
}
