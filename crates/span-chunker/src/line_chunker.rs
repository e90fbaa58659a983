use crate::config::FallbackConfig;
use crate::error::Result;
use crate::span::{LineIndex, Span};

/// Sliding line window for files without a usable grammar.
///
/// Consecutive windows share `overlap` lines; the walk stops at the first
/// window that reaches the end of the file.
#[derive(Debug, Clone, Copy)]
pub struct LineChunker {
    line_count: usize,
    overlap: usize,
}

impl LineChunker {
    /// Fails with `InvalidConfig` unless `overlap < line_count`.
    pub fn new(config: FallbackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            line_count: config.line_count,
            overlap: config.overlap,
        })
    }

    /// Line windows over `text`, 0-based and half-open.
    pub fn chunk(&self, text: &str) -> Vec<Span> {
        self.windows(LineIndex::new(text).line_count())
    }

    fn windows(&self, total: usize) -> Vec<Span> {
        let step = self.line_count - self.overlap;
        let mut windows = Vec::new();
        let mut start = 0;

        while start < total {
            let end = (start + self.line_count).min(total);
            windows.push(Span::new(start, end));
            if end == total {
                break;
            }
            start += step;
        }

        windows
    }
}

impl Default for LineChunker {
    fn default() -> Self {
        let config = FallbackConfig::default();
        Self {
            line_count: config.line_count,
            overlap: config.overlap,
        }
    }
}
