use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` over byte offsets or line numbers.
///
/// The syntax chunker works on byte offsets first and converts to line
/// numbers at the end; the span itself does not record which unit it holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} exceeds end {end}");
        Self { start, end }
    }

    /// Zero-width span positioned at `offset`
    #[must_use]
    pub const fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Extract the covered text, treating the span as byte offsets.
    ///
    /// Offsets past the end of `text` or off a char boundary yield `""`.
    #[must_use]
    pub fn extract(self, text: &str) -> &str {
        text.get(self.start..self.end.min(text.len()))
            .unwrap_or_default()
    }

    /// Extract the covered lines joined by `'\n'`, treating the span as line numbers.
    #[must_use]
    pub fn extract_lines(self, text: &str) -> String {
        let lines = split_lines(text);
        lines
            .get(self.start..self.end.min(lines.len()))
            .map(|lines| lines.join("\n"))
            .unwrap_or_default()
    }
}

/// Split text into lines on `'\n'`. A trailing newline does not open an extra line.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

/// Precomputed line starts for offset → line lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
    trailing_newline: bool,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let len = text.len();
        let mut starts = Vec::new();
        if len > 0 {
            starts.push(0);
        }
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' && i + 1 < len {
                starts.push(i + 1);
            }
        }

        Self {
            starts,
            len,
            trailing_newline: text.ends_with('\n'),
        }
    }

    /// Number of lines in the text
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Line containing byte `offset` (0-based).
    ///
    /// The offset just past a trailing newline maps to `line_count()`.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        if offset >= self.len {
            return if self.trailing_newline {
                self.line_count()
            } else {
                self.line_count().saturating_sub(1)
            };
        }
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Convert a byte-offset span to the line span between the lines containing its ends.
    #[must_use]
    pub fn to_lines(&self, span: Span) -> Span {
        Span::new(self.line_of(span.start), self.line_of(span.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_len_and_extract() {
        let text = "fn main() {}\n";
        let span = Span::new(3, 7);
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
        assert_eq!(span.extract(text), "main");

        assert!(Span::empty_at(5).is_empty());
        assert_eq!(Span::new(11, 100).extract(text), "}\n");
        assert_eq!(Span::new(50, 60).extract(text), "");
    }

    #[test]
    fn test_extract_lines() {
        let text = "a\nb\nc\nd\n";
        assert_eq!(Span::new(1, 3).extract_lines(text), "b\nc");
        assert_eq!(Span::new(0, 4).extract_lines(text), "a\nb\nc\nd");
        assert_eq!(Span::new(3, 10).extract_lines(text), "d");
        assert_eq!(Span::new(5, 6).extract_lines(text), "");
    }

    #[test]
    fn test_split_lines_trailing_newline() {
        assert_eq!(split_lines(""), Vec::<&str>::new());
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
    }

    #[test]
    fn test_line_index_lookup() {
        let text = "ab\ncd\n\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 4);

        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(7), 3);
        assert_eq!(index.line_of(text.len()), 3);
    }

    #[test]
    fn test_line_index_trailing_newline() {
        let text = "ab\ncd\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_of(text.len()), 2);
        assert_eq!(index.to_lines(Span::new(0, 3)), Span::new(0, 1));
        assert_eq!(index.to_lines(Span::new(3, text.len())), Span::new(1, 2));
    }

    #[test]
    fn test_line_index_empty() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 0);
        assert_eq!(index.line_of(0), 0);
    }
}
