use serde::{Deserialize, Serialize};

/// A bounded piece of a source file, ready for embedding and indexing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeSnippet {
    /// Source file path
    pub file_path: String,

    /// Start line (0-indexed, inclusive)
    pub start_line: usize,

    /// End line (0-indexed, exclusive)
    pub end_line: usize,

    /// The snippet's lines joined by `'\n'`
    pub content: String,

    /// Enclosing symbol; filled in by downstream enrichment, never by the chunker
    pub symbol_name: Option<String>,

    /// Which chunking path produced this snippet
    pub strategy: ChunkStrategy,
}

impl CodeSnippet {
    /// Create a new snippet
    #[must_use]
    pub const fn new(
        file_path: String,
        start_line: usize,
        end_line: usize,
        content: String,
        strategy: ChunkStrategy,
    ) -> Self {
        Self {
            file_path,
            start_line,
            end_line,
            content,
            symbol_name: None,
            strategy,
        }
    }

    /// Get the number of lines in this snippet
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }

    /// Check if snippet contains a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line < self.end_line
    }

    #[must_use]
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// How a snippet's boundaries were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Syntax-tree boundaries, budgeted by characters
    Syntax,
    /// Fixed line windows with overlap
    LineWindow,
}

impl ChunkStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::LineWindow => "line_window",
        }
    }
}
