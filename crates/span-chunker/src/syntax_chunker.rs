use crate::config::ChunkerConfig;
use crate::span::{LineIndex, Span};
use crate::syntax::SyntaxNode;

/// Splits a parsed file into contiguous line spans along syntax node boundaries.
///
/// Works in four passes:
/// 1. greedy packing of sibling nodes into byte spans of at most `max_chars`,
///    descending into any node that is too large on its own;
/// 2. gap filling so consecutive spans touch;
/// 3. coalescing of spans until each has more than `coalesce` non-whitespace
///    characters and contains a line break;
/// 4. conversion to line numbers, dropping empty spans and folding a short
///    trailing span into its predecessor.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxChunker {
    max_chars: usize,
    coalesce: usize,
}

impl SyntaxChunker {
    #[must_use]
    pub const fn new(max_chars: usize, coalesce: usize) -> Self {
        Self {
            max_chars,
            coalesce,
        }
    }

    #[must_use]
    pub const fn from_config(config: &ChunkerConfig) -> Self {
        Self::new(config.max_chars, config.coalesce)
    }

    /// Chunk `text` using the tree rooted at `root`.
    ///
    /// Returns 0-based half-open line spans covering `[0, line_count)` exactly once.
    pub fn chunk<N: SyntaxNode>(&self, root: &N, text: &str) -> Vec<Span> {
        let index = LineIndex::new(text);

        let mut spans = self.pack(root);
        if spans.len() < 2 {
            return whole_file(text, &index);
        }

        fill_gaps(&mut spans);
        let spans = self.coalesce(&spans, text);

        let mut lines = to_line_spans(&spans, &index);
        if lines.is_empty() {
            return whole_file(text, &index);
        }
        self.merge_short_tail(&mut lines);
        lines
    }

    /// Greedy packing of sibling nodes into byte spans.
    ///
    /// Spans end exactly at node boundaries; whitespace between nodes is left
    /// for `fill_gaps`.
    fn pack<N: SyntaxNode>(&self, root: &N) -> Vec<Span> {
        let mut chunks = Vec::new();
        let mut stack = vec![Frame::new(root)];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.children.next() else {
                chunks.push(frame.current);
                stack.pop();
                continue;
            };

            let span = child.byte_span();
            if span.len() > self.max_chars {
                chunks.push(frame.current);
                frame.current = Span::empty_at(span.end);
                stack.push(Frame::new(&child));
            } else if span.len() + frame.current.len() > self.max_chars {
                chunks.push(frame.current);
                frame.current = span;
            } else {
                frame.current = Span::new(frame.current.start, span.end);
            }
        }

        chunks
    }

    fn coalesce(&self, spans: &[Span], text: &str) -> Vec<Span> {
        let mut out = Vec::new();
        let mut current = Span::empty_at(0);

        for span in spans {
            current = Span::new(current.start, span.end);
            let body = current.extract(text);
            if non_whitespace_len(body) > self.coalesce && body.contains('\n') {
                out.push(current);
                current = Span::empty_at(span.end);
            }
        }

        if !current.is_empty() {
            out.push(current);
        }
        out
    }

    /// Fold a trailing span shorter than `coalesce` lines into its predecessor.
    fn merge_short_tail(&self, lines: &mut Vec<Span>) {
        if let [.., prev, last] = lines.as_mut_slice() {
            if last.len() < self.coalesce {
                prev.end = last.end;
                lines.pop();
            }
        }
    }
}

/// One level of the packing walk: the remaining children of a node and the
/// span accumulated from them so far.
struct Frame<N> {
    children: std::vec::IntoIter<N>,
    current: Span,
}

impl<N: SyntaxNode> Frame<N> {
    fn new(node: &N) -> Self {
        Self {
            children: node.children().into_iter(),
            current: Span::empty_at(node.start_byte()),
        }
    }
}

fn fill_gaps(spans: &mut [Span]) {
    for i in 1..spans.len() {
        spans[i - 1].end = spans[i].start;
    }
}

fn to_line_spans(spans: &[Span], index: &LineIndex) -> Vec<Span> {
    let mut lines: Vec<Span> = spans
        .iter()
        .map(|span| index.to_lines(*span))
        .filter(|span| !span.is_empty())
        .collect();

    // Text after the last node (trailing comments, blank lines) belongs to the last span.
    if let Some(last) = lines.last_mut() {
        last.end = last.end.max(index.line_count());
    }
    lines
}

fn whole_file(text: &str, index: &LineIndex) -> Vec<Span> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    vec![Span::new(0, index.line_count())]
}

/// Count of characters that are not whitespace
#[must_use]
pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
