use crate::parsing::inline::{
    cursor::Cursor,
    token::{Token, TokenKind},
};

/// Hashtag: `#` followed by `[A-Za-z0-9_/-]+` containing at least one
/// non-digit, so `#123` stays plain text while `#123/tag` is a tag.
pub struct Tag;

impl Tag {
    pub const MARKER: u8 = b'#';

    pub fn is_tag_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'/')
    }
}

/// Tokenizes a tag starting at the cursor.
///
/// A `#` glued to a preceding word (`foo#bar`) is not a tag, unless the
/// preceding construct was itself a tag (`#a#b` yields two tags); the caller
/// reports that through `chained`. On failure the cursor is left where it was.
pub fn tokenize(cur: &mut Cursor<'_>, chained: bool) -> Option<Vec<Token>> {
    if cur.peek() != Some(Tag::MARKER) {
        return None;
    }
    if !chained && cur.prev().is_some_and(|b| b > b' ') {
        return None;
    }

    let saved = *cur;
    let start = cur.pos();
    cur.bump();
    let marker = cur.span_from(start);

    let content_start = cur.pos();
    while cur.peek().is_some_and(|b| b.is_ascii_digit()) {
        cur.bump();
    }
    if !cur.peek().is_some_and(Tag::is_tag_byte) {
        // empty, or digits only
        *cur = saved;
        return None;
    }
    while cur.peek().is_some_and(Tag::is_tag_byte) {
        cur.bump();
    }

    Some(vec![
        Token::new(TokenKind::TagMarker, marker),
        Token::new(TokenKind::TagContent, cur.span_from(content_start)),
    ])
}
