use serde::{Deserialize, Serialize};

use crate::error::{ChunkerError, Result};

/// Configuration for thread chunking behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Hard limit on chunk length in characters
    pub max_chunk_chars: usize,

    /// Soft threshold: an accumulator fuller than this is flushed before more
    /// content is appended
    pub soft_flush_chars: usize,

    /// Marker appended to chunks that end in a forced mid-sentence split
    pub continuation_marker: String,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 250,
            soft_flush_chars: 200,
            continuation_marker: "...".to_string(),
        }
    }
}

impl ChunkerConfig {
    /// Create config sized for Twitter-style posts (the default)
    #[must_use]
    pub fn for_twitter() -> Self {
        Self::default()
    }

    /// Create config sized for Mastodon's 500-character posts
    #[must_use]
    pub fn for_mastodon() -> Self {
        Self {
            max_chunk_chars: 500,
            soft_flush_chars: 400,
            ..Default::default()
        }
    }

    /// Create config sized for single-part SMS messages
    #[must_use]
    pub fn for_sms() -> Self {
        Self {
            max_chunk_chars: 160,
            soft_flush_chars: 130,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_chars == 0 {
            return Err(ChunkerError::invalid_config("max_chunk_chars must be > 0"));
        }

        if self.soft_flush_chars >= self.max_chunk_chars {
            return Err(ChunkerError::invalid_config(format!(
                "soft_flush_chars ({}) must be below max_chunk_chars ({})",
                self.soft_flush_chars, self.max_chunk_chars
            )));
        }

        let marker_chars = self.continuation_marker.chars().count();
        if marker_chars >= self.max_chunk_chars {
            return Err(ChunkerError::invalid_config(format!(
                "continuation_marker ({marker_chars} chars) leaves no room under \
                 max_chunk_chars ({})",
                self.max_chunk_chars
            )));
        }

        Ok(())
    }

    /// Character budget for a forced-split prefix, with the continuation
    /// marker reserved so the emitted chunk stays within the hard limit.
    pub(crate) fn forced_split_budget(&self) -> usize {
        self.max_chunk_chars - self.continuation_marker.chars().count()
    }
}
