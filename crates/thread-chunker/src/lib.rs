//! # Thread Chunker
//!
//! Deterministic segmentation of long generated text into bounded-length
//! posts for length-limited messaging media.
//!
//! ## Philosophy
//!
//! The chunker produces an ordered thread of posts that:
//! - Never exceed the configured hard character limit
//! - Break at sentence boundaries where possible, word boundaries otherwise
//! - Preserve the source text order exactly
//! - Carry a continuation marker wherever a sentence had to be cut
//!
//! ## Architecture
//!
//! ```text
//! Response text
//!     │
//!     ├──> Paragraph split (line breaks, trimmed, empties dropped)
//!     │
//!     ├──> Sentence segmentation (injectable SentenceSegmenter)
//!     │    └─> False-split repair (abbreviation + tech-token merge)
//!     │
//!     ├──> Accumulation
//!     │    ├─> Soft flush past the fill threshold
//!     │    ├─> Blank-line sentence joins under the hard limit
//!     │    └─> Forced word-level split with continuation marker
//!     │
//!     └──> Post-processing
//!          ├─> Trim + drop empty drafts
//!          └─> Number posts "i/N" when the thread has more than one
//! ```
//!
//! ## Example
//!
//! ```rust
//! use thread_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default());
//!
//! let posts = chunker.thread("Hello world.").unwrap();
//! assert_eq!(posts, vec!["Hello world.".to_string()]);
//!
//! let chunks = chunker.chunk_str("Hello world.").unwrap();
//! assert!(chunks.iter().all(|c| c.char_count() <= 250));
//! ```

mod chunker;
mod config;
mod error;
mod segmenter;
mod types;

pub use chunker::{Chunker, ThreadStats};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use segmenter::{SentenceSegmenter, UnicodeSegmenter};
pub use types::{Chunk, ChunkMetadata};
