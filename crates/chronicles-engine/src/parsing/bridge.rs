//! Builds AST nodes out of the token stream of the inline tokenizers.
//!
//! [`NodeBuilder`] is the single construction state: it owns the node under
//! construction and the nodes finished so far, and every token is routed
//! through [`NodeBuilder::push`]. Content tokens only fill a field when the
//! node under construction is of the matching kind; a stray sub-token is
//! ignored.

use crate::{
    mdast::{LinkKind, Node, Tag, WikiLink, default_display_value},
    parsing::{
        inline::token::{Token, TokenKind},
        span::Span,
    },
};

#[derive(Debug)]
enum Pending {
    /// A wikilink or embed. `opened` flips once `[[` has been seen so an
    /// embed marker followed by `[[` stays a single node.
    Link { link: WikiLink, opened: bool },
    Tag,
}

#[derive(Debug)]
pub struct NodeBuilder<'s> {
    source: &'s str,
    pending: Option<Pending>,
    out: Vec<Node>,
}

impl<'s> NodeBuilder<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            pending: None,
            out: Vec::new(),
        }
    }

    /// Appends plain text covering `span`.
    pub fn text(&mut self, span: Span) {
        let text = span.slice(self.source);
        if text.is_empty() {
            return;
        }
        match self.out.last_mut() {
            Some(Node::Text { value }) => value.push_str(text),
            _ => self.out.push(Node::text(text)),
        }
    }

    pub fn push(&mut self, token: Token) {
        match token.kind {
            TokenKind::EmbedMarker => {
                self.pending = Some(Pending::Link {
                    link: WikiLink::new(LinkKind::Embed, ""),
                    opened: false,
                });
            }
            TokenKind::OpenMarker => match &mut self.pending {
                Some(Pending::Link { opened, .. }) if !*opened => *opened = true,
                _ => {
                    self.pending = Some(Pending::Link {
                        link: WikiLink::new(LinkKind::Link, ""),
                        opened: true,
                    });
                }
            },
            TokenKind::Path => {
                if let Some(Pending::Link { link, .. }) = &mut self.pending {
                    link.url = token.text(self.source).to_string();
                    link.value = default_display_value(&link.url);
                }
            }
            TokenKind::Hash => {
                if let Some(Pending::Link { link, .. }) = &mut self.pending {
                    link.hash = token.text(self.source).to_string();
                }
            }
            TokenKind::Alias => {
                if let Some(Pending::Link { link, .. }) = &mut self.pending {
                    link.value = token.text(self.source).to_string();
                }
            }
            TokenKind::HashMarker | TokenKind::AliasMarker => {}
            TokenKind::CloseMarker => {
                if let Some(Pending::Link { link, .. }) = self.pending.take() {
                    self.out.push(Node::WikiLink(link));
                }
            }
            TokenKind::TagMarker => self.pending = Some(Pending::Tag),
            TokenKind::TagContent => {
                if let Some(Pending::Tag) = self.pending {
                    self.pending = None;
                    self.out.push(Node::Tag(Tag::new(token.text(self.source))));
                }
            }
        }
    }

    /// Finished nodes. A construct that never completed produces nothing.
    pub fn finish(self) -> Vec<Node> {
        if let Some(pending) = self.pending {
            log::debug!("dropping incomplete inline construct: {pending:?}");
        }
        self.out
    }
}

/// Builds nodes from a complete token stream over `source`.
pub fn build_nodes(source: &str, tokens: &[Token]) -> Vec<Node> {
    let mut builder = NodeBuilder::new(source);
    for &token in tokens {
        builder.push(token);
    }
    builder.finish()
}
