use serde::Serialize;

/// A byte range `[start, end)` into the source buffer.
///
/// Tokens store spans rather than copied text; slicing the source with a
/// span reproduces the exact characters the token covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Slices `source` with this span.
    ///
    /// Spans handed out by the tokenizers always sit on char boundaries, so
    /// this only yields `""` for a span that was not produced against `source`.
    pub fn slice(self, source: &str) -> &str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_and_empty() {
        assert_eq!(Span::new(2, 7).len(), 5);
        assert!(Span::new(4, 4).is_empty());
        // inverted spans saturate instead of underflowing
        assert!(Span::new(9, 3).is_empty());
    }

    #[test]
    fn slice_reproduces_source() {
        let src = "see [[plan]] now";
        assert_eq!(Span::new(4, 12).slice(src), "[[plan]]");
        assert_eq!(Span::new(6, 10).slice(src), "plan");
    }

    #[test]
    fn slice_out_of_bounds_is_empty() {
        assert_eq!(Span::new(3, 99).slice("abc"), "");
    }
}
