use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for code chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Character budget per syntactic chunk (soft limit, measured in bytes)
    pub max_chars: usize,

    /// Minimum non-whitespace length before a chunk may stand alone.
    /// Also the line-count floor for the trailing chunk.
    pub coalesce: usize,

    /// Window used when no grammar is available for a file
    pub fallback: FallbackConfig,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chars: 512 * 3,
            coalesce: 50,
            fallback: FallbackConfig::default(),
        }
    }
}

impl ChunkerConfig {
    /// Create config optimized for embeddings (~512 tokens per chunk)
    pub fn for_embeddings() -> Self {
        Self::default()
    }

    /// Create config optimized for LLM context (larger, comprehensive chunks)
    pub fn for_llm_context() -> Self {
        Self {
            max_chars: 4096,
            coalesce: 100,
            fallback: FallbackConfig {
                line_count: 60,
                overlap: 20,
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(ChunkerError::invalid_config("max_chars must be > 0"));
        }

        self.fallback.validate()
    }
}

/// Sliding line window for grammar-less files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Lines per window
    pub line_count: usize,

    /// Lines shared between consecutive windows
    pub overlap: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            line_count: 30,
            overlap: 15,
        }
    }
}

impl FallbackConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.overlap >= self.line_count {
            return Err(ChunkerError::invalid_config(format!(
                "overlap ({}) must be smaller than line_count ({})",
                self.overlap, self.line_count
            )));
        }

        Ok(())
    }
}
