//! # Context Span Chunker
//!
//! Splits source files into bounded, contiguous snippets for embedding and
//! search indexing.
//!
//! ## Philosophy
//!
//! - Chunk boundaries follow syntax nodes whenever a grammar is available
//! - Every line of a file lands in exactly one syntax-mode snippet
//! - Tiny fragments (a lone closing brace) are folded into their neighbours
//! - A missing or broken grammar never blocks indexing: the file is still
//!   chunked, just with line windows
//!
//! ## Architecture
//!
//! ```text
//! File path
//!     │
//!     ├──> Read text (I/O errors propagate)
//!     │
//!     ├──> GrammarRegistry::get(extension)
//!     │    └─> single-flight load, cached for the registry's lifetime
//!     │
//!     ├──> Parser available?
//!     │    ├─ yes ─> SyntaxChunker
//!     │    │         ├─> pack sibling nodes within the character budget
//!     │    │         ├─> fill gaps between spans
//!     │    │         ├─> coalesce small spans
//!     │    │         └─> convert to line spans, fold short tail
//!     │    └─ no ──> LineChunker (overlapping line windows)
//!     │
//!     └──> CodeSnippet[] with text and line numbers
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_span_chunker::{Chunker, ChunkerConfig};
//!
//! # async fn run() -> context_span_chunker::Result<()> {
//! let chunker = Chunker::new(ChunkerConfig::default())?;
//!
//! let code = r#"
//! fn process_data(input: &str) -> String {
//!     input.trim().to_uppercase()
//! }
//! "#;
//!
//! for snippet in chunker.chunk_source(code, "example.rs").await {
//!     println!("Lines {}..{}: {}", snippet.start_line, snippet.end_line, snippet.content);
//! }
//! # Ok(())
//! # }
//! ```

mod chunker;
mod config;
mod error;
mod grammar;
mod line_chunker;
mod span;
mod syntax;
mod syntax_chunker;
mod types;

pub use chunker::{Chunker, ChunkingStats};
pub use config::{ChunkerConfig, FallbackConfig};
pub use error::{ChunkerError, Result};
pub use grammar::{BundledGrammars, Grammar, GrammarHandle, GrammarLoader, GrammarRegistry};
pub use line_chunker::LineChunker;
pub use span::{LineIndex, Span};
pub use syntax::SyntaxNode;
pub use syntax_chunker::{non_whitespace_len, SyntaxChunker};
pub use types::{ChunkStrategy, CodeSnippet};
