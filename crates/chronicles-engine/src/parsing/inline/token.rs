use serde::Serialize;

use crate::parsing::span::Span;

/// Classification of a token emitted by the wikilink and tag tokenizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// `[[`
    OpenMarker,
    /// The `!` in front of an embed.
    EmbedMarker,
    /// Link target, up to the first section delimiter.
    Path,
    /// `#` introducing the heading/block section.
    HashMarker,
    Hash,
    /// `|` introducing the alias section.
    AliasMarker,
    Alias,
    /// `]]`
    CloseMarker,
    /// The `#` in front of a tag.
    TagMarker,
    TagContent,
}

impl TokenKind {
    /// Content tokens carry text the AST bridge slices out of the source.
    pub fn is_content(self) -> bool {
        matches!(
            self,
            TokenKind::Path | TokenKind::Hash | TokenKind::Alias | TokenKind::TagContent
        )
    }
}

/// A classified span of the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn text(self, source: &str) -> &str {
        self.span.slice(source)
    }
}
