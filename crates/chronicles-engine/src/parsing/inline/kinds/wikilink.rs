use crate::parsing::{
    inline::{
        cursor::Cursor,
        token::{Token, TokenKind},
    },
    span::Span,
};

/// Obsidian-style wikilink: `[[path#hash|alias]]`, or `![[...]]` for embeds.
pub struct WikiLink;

impl WikiLink {
    pub const EMBED: u8 = b'!';
    pub const OPEN: &'static [u8; 2] = b"[[";
    pub const CLOSE: &'static [u8; 2] = b"]]";
    pub const HASH: u8 = b'#';
    pub const ALIAS: u8 = b'|';
}

/// Where the scanner stands between sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Right after `[[`: path, `#`, `|` or `]` may follow.
    Open,
    /// Right after `#`: hash content, `|` or `]` may follow.
    AfterHashMarker,
    /// Right after `|`: alias content or `]` may follow.
    AfterAliasMarker,
}

impl State {
    fn section(self) -> Section {
        match self {
            State::Open => Section::Path,
            State::AfterHashMarker => Section::Hash,
            State::AfterAliasMarker => Section::Alias,
        }
    }
}

/// A content section of the link.
///
/// Each section ends on its own delimiter set, and a run of spaces is only
/// trailing (absorbed) when one of those same delimiters follows it. The
/// alias is terminal, so only `]` ends it; `#` and `|` inside an alias are
/// literal, as is `#` inside a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Path,
    Hash,
    Alias,
}

impl Section {
    fn token_kind(self) -> TokenKind {
        match self {
            Section::Path => TokenKind::Path,
            Section::Hash => TokenKind::Hash,
            Section::Alias => TokenKind::Alias,
        }
    }

    fn ends_on(self, b: u8) -> bool {
        match self {
            Section::Path => matches!(b, WikiLink::HASH | WikiLink::ALIAS | b']'),
            Section::Hash => matches!(b, WikiLink::ALIAS | b']'),
            Section::Alias => b == b']',
        }
    }
}

/// Tokenizes a wikilink or embed starting at the cursor.
///
/// On success the cursor sits just past the closing `]]` and the returned
/// tokens are in source order. On failure the cursor is left where it was
/// and the caller treats the characters as plain text.
pub fn tokenize(cur: &mut Cursor<'_>) -> Option<Vec<Token>> {
    let saved = *cur;
    let tokens = scan(cur);
    if tokens.is_none() {
        *cur = saved;
    }
    tokens
}

fn scan(cur: &mut Cursor<'_>) -> Option<Vec<Token>> {
    let mut out = Vec::with_capacity(8);

    if cur.peek() == Some(WikiLink::EMBED) {
        out.push(take(cur, TokenKind::EmbedMarker, 1));
    }
    if !cur.starts_with(WikiLink::OPEN) {
        return None;
    }
    out.push(take(cur, TokenKind::OpenMarker, WikiLink::OPEN.len()));

    let mut state = State::Open;
    loop {
        // whitespace right after a marker is never content
        cur.skip_spaces();
        let section = match (state, cur.peek()?) {
            (_, b']') => return close(cur, out),
            (State::Open, WikiLink::HASH) => {
                out.push(take(cur, TokenKind::HashMarker, 1));
                state = State::AfterHashMarker;
                continue;
            }
            (State::Open | State::AfterHashMarker, WikiLink::ALIAS) => {
                out.push(take(cur, TokenKind::AliasMarker, 1));
                state = State::AfterAliasMarker;
                continue;
            }
            (_, b) if b > b' ' => state.section(),
            _ => return None,
        };

        let span = scan_content(cur, section)?;
        out.push(Token::new(section.token_kind(), span));

        // content only stops in front of one of its section's delimiters
        match cur.peek()? {
            WikiLink::HASH => {
                out.push(take(cur, TokenKind::HashMarker, 1));
                state = State::AfterHashMarker;
            }
            WikiLink::ALIAS => {
                out.push(take(cur, TokenKind::AliasMarker, 1));
                state = State::AfterAliasMarker;
            }
            _ => return close(cur, out),
        }
    }
}

/// Scans section content up to (not including) a delimiter.
///
/// A space triggers a lookahead over the whole space run: if the next
/// non-space byte ends the section the run is trailing and is consumed
/// without becoming content; otherwise the space is literal.
fn scan_content(cur: &mut Cursor<'_>, section: Section) -> Option<Span> {
    let start = cur.pos();
    loop {
        let b = cur.peek()?;
        if section.ends_on(b) {
            return Some(cur.span_from(start));
        }
        if b == b' ' {
            let mut ahead = 1;
            while cur.peek_at(ahead) == Some(b' ') {
                ahead += 1;
            }
            if cur.peek_at(ahead).is_some_and(|d| section.ends_on(d)) {
                let span = cur.span_from(start);
                cur.bump_n(ahead);
                return Some(span);
            }
            cur.bump();
            continue;
        }
        if b <= b' ' {
            return None;
        }
        cur.bump();
    }
}

fn close(cur: &mut Cursor<'_>, mut out: Vec<Token>) -> Option<Vec<Token>> {
    if !cur.starts_with(WikiLink::CLOSE) {
        return None;
    }
    out.push(take(cur, TokenKind::CloseMarker, WikiLink::CLOSE.len()));
    Some(out)
}

fn take(cur: &mut Cursor<'_>, kind: TokenKind, len: usize) -> Token {
    let start = cur.pos();
    cur.bump_n(len);
    Token::new(kind, cur.span_from(start))
}
