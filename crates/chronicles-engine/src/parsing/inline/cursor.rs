use crate::parsing::span::Span;

/// A cursor for byte-by-byte inline scanning with position tracking.
///
/// The cursor walks a window (`[i, end)`) of the full source buffer so that
/// positions are absolute and the byte *before* the window stays visible for
/// lookback. All delimiters the tokenizers care about are ASCII, so stepping
/// through the bytes of a multi-byte character never produces a false match.
///
/// `Cursor` is `Copy`: saving and restoring a position is a plain value copy.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    /// The complete source buffer.
    pub s: &'a str,
    /// Current absolute byte index into `s`.
    pub i: usize,
    /// Exclusive upper bound of the scanned window.
    pub end: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `span` of `s`, positioned at `span.start`.
    pub fn new(s: &'a str, span: Span) -> Self {
        let end = span.end.min(s.len());
        Self {
            s,
            i: span.start.min(end),
            end,
        }
    }

    /// Creates a cursor over the whole of `s`.
    pub fn over(s: &'a str) -> Self {
        Self::new(s, Span::new(0, s.len()))
    }

    /// Returns the current absolute byte position.
    pub fn pos(&self) -> usize {
        self.i
    }

    /// Returns true if at the end of the window.
    pub fn eof(&self) -> bool {
        self.i >= self.end
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Peeks `n` bytes ahead of the current position, bounded by the window.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        let at = self.i + n;
        if at < self.end {
            self.s.as_bytes().get(at).copied()
        } else {
            None
        }
    }

    /// The byte immediately before the current position.
    ///
    /// May reach in front of the window: the first byte of a text run still
    /// sees the character that preceded it in the document.
    pub fn prev(&self) -> Option<u8> {
        self.i
            .checked_sub(1)
            .and_then(|at| self.s.as_bytes().get(at).copied())
    }

    /// Checks if the remaining window starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i.min(self.end)..self.end].starts_with(pat)
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Advances past a run of spaces, returning how many were consumed.
    pub fn skip_spaces(&mut self) -> usize {
        let start = self.i;
        while self.peek() == Some(b' ') {
            self.i += 1;
        }
        self.i - start
    }

    /// The span from `start` up to the current position.
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.i)
    }
}
