use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::grammar::{GrammarHandle, GrammarRegistry};
use crate::line_chunker::LineChunker;
use crate::span::{split_lines, Span};
use crate::syntax_chunker::SyntaxChunker;
use crate::types::{ChunkStrategy, CodeSnippet};
use std::path::Path;
use std::sync::Arc;

/// Main chunker interface for processing code
///
/// Picks syntax-aware chunking when a grammar is available for the file's
/// extension and falls back to line windows otherwise. One registry can be
/// shared by many chunkers.
pub struct Chunker {
    config: ChunkerConfig,
    line_chunker: LineChunker,
    registry: Arc<GrammarRegistry>,
}

impl Chunker {
    /// Create a new chunker with its own grammar registry
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        Self::with_registry(config, Arc::new(GrammarRegistry::new()))
    }

    /// Create a chunker backed by a shared registry
    pub fn with_registry(config: ChunkerConfig, registry: Arc<GrammarRegistry>) -> Result<Self> {
        config.validate()?;
        let line_chunker = LineChunker::new(config.fallback)?;

        Ok(Self {
            config,
            line_chunker,
            registry,
        })
    }

    /// Read and chunk a file.
    ///
    /// I/O failures are returned as-is; a missing or broken grammar only
    /// changes the chunking strategy.
    pub async fn chunk_code_file(&self, path: impl AsRef<Path>) -> Result<Vec<CodeSnippet>> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let file_path = path.to_string_lossy();

        Ok(self.chunk_source(&content, &file_path).await)
    }

    /// Chunk in-memory source; `file_path` selects the grammar by extension
    pub async fn chunk_source(&self, content: &str, file_path: &str) -> Vec<CodeSnippet> {
        let extension = Path::new(file_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        if let Some(handle) = self.registry.get(extension).await {
            match self.chunk_with_syntax(&handle, content, file_path) {
                Ok(snippets) => return snippets,
                Err(e) => {
                    log::warn!("Syntax chunking failed for {file_path}, using line windows: {e}");
                }
            }
        }

        self.chunk_with_lines(content, file_path)
    }

    fn chunk_with_syntax(
        &self,
        handle: &GrammarHandle,
        content: &str,
        file_path: &str,
    ) -> Result<Vec<CodeSnippet>> {
        let tree = handle.parse(content)?;
        let spans = SyntaxChunker::from_config(&self.config).chunk(&tree.root_node(), content);
        log::debug!(
            "Chunked {file_path} into {} syntax spans ({})",
            spans.len(),
            handle.grammar()
        );

        Ok(materialize(&spans, content, file_path, ChunkStrategy::Syntax))
    }

    fn chunk_with_lines(&self, content: &str, file_path: &str) -> Vec<CodeSnippet> {
        let spans = self.line_chunker.chunk(content);
        log::debug!("Chunked {file_path} into {} line windows", spans.len());

        materialize(&spans, content, file_path, ChunkStrategy::LineWindow)
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<GrammarRegistry> {
        &self.registry
    }

    /// Get statistics about chunking
    #[must_use]
    pub fn get_stats(snippets: &[CodeSnippet]) -> ChunkingStats {
        let total_chars: usize = snippets.iter().map(CodeSnippet::char_count).sum();

        ChunkingStats {
            total_chunks: snippets.len(),
            total_lines: snippets.iter().map(CodeSnippet::line_count).sum(),
            total_chars,
            avg_chars_per_chunk: if snippets.is_empty() {
                0
            } else {
                total_chars / snippets.len()
            },
            min_chars: snippets
                .iter()
                .map(CodeSnippet::char_count)
                .min()
                .unwrap_or(0),
            max_chars: snippets
                .iter()
                .map(CodeSnippet::char_count)
                .max()
                .unwrap_or(0),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
            line_chunker: LineChunker::default(),
            registry: Arc::new(GrammarRegistry::new()),
        }
    }
}

fn materialize(
    spans: &[Span],
    content: &str,
    file_path: &str,
    strategy: ChunkStrategy,
) -> Vec<CodeSnippet> {
    let lines = split_lines(content);
    spans
        .iter()
        .map(|span| {
            let text = lines
                .get(span.start..span.end)
                .map(|lines| lines.join("\n"))
                .unwrap_or_default();
            CodeSnippet::new(file_path.to_string(), span.start, span.end, text, strategy)
        })
        .collect()
}

/// Statistics about chunking results
#[derive(Debug, Clone)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_lines: usize,
    pub total_chars: usize,
    pub avg_chars_per_chunk: usize,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Lines: {} | Chars: {} | Avg: {} | Range: {}-{}",
            self.total_chunks,
            self.total_lines,
            self.total_chars,
            self.avg_chars_per_chunk,
            self.min_chars,
            self.max_chars
        )
    }
}
