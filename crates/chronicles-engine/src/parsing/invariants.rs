use crate::parsing::inline::{Token, TokenKind};

/// Asserts the structural guarantees of a token stream over `source`:
/// spans in bounds and on char boundaries, left to right without overlap,
/// and markers never empty.
pub fn check(source: &str, tokens: &[Token]) {
    let n = source.len();
    for t in tokens {
        assert!(
            t.span.start <= t.span.end && t.span.end <= n,
            "token span out of bounds: {:?} (source len: {})",
            t,
            n
        );
        assert!(
            source.is_char_boundary(t.span.start) && source.is_char_boundary(t.span.end),
            "token span splits a character: {:?}",
            t
        );
        if !t.kind.is_content() {
            assert!(!t.span.is_empty(), "empty marker token: {:?}", t);
        }
        if t.kind == TokenKind::TagContent {
            assert!(
                !t.text(source).starts_with('#'),
                "tag content includes its marker: {:?}",
                t
            );
        }
    }
    for pair in tokens.windows(2) {
        assert!(
            pair[0].span.end <= pair[1].span.start,
            "tokens out of order or overlapping: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
}
