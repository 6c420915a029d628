use crate::{
    mdast::Node,
    parsing::{bridge::NodeBuilder, span::Span},
};

use super::{
    cursor::Cursor,
    kinds::{Tag, WikiLink, tag, wikilink},
    token::{Token, TokenKind},
};

/// A piece of a scanned text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text between constructs.
    Text(Span),
    /// The complete token sequence of one wikilink, embed or tag.
    Construct(Vec<Token>),
}

/// Splits `span` of `source` into plain text and dialect constructs.
///
/// Segments cover the span without gaps, in source order. Text is only ever
/// split in front of an ASCII delimiter, so every segment boundary is a char
/// boundary.
pub fn scan(source: &str, span: Span) -> Vec<Segment> {
    let mut cur = Cursor::new(source, span);
    let mut out = vec![];
    let mut text_start = cur.pos();
    let mut last_tag_end = None;

    fn flush_text(out: &mut Vec<Segment>, start: usize, end: usize) {
        if end > start {
            out.push(Segment::Text(Span::new(start, end)));
        }
    }

    while !cur.eof() {
        let start = cur.pos();
        if let Some(tokens) = try_construct(&mut cur, last_tag_end == Some(start)) {
            flush_text(&mut out, text_start, start);
            if tokens.last().is_some_and(|t| t.kind == TokenKind::TagContent) {
                last_tag_end = Some(cur.pos());
            }
            text_start = cur.pos();
            out.push(Segment::Construct(tokens));
            continue;
        }
        cur.bump();
    }

    flush_text(&mut out, text_start, cur.pos());
    out
}

/// Dispatches on the byte under the cursor. `chained` is true when a tag
/// ended exactly here.
fn try_construct(cur: &mut Cursor<'_>, chained: bool) -> Option<Vec<Token>> {
    match cur.peek()? {
        WikiLink::EMBED | b'[' => wikilink::tokenize(cur),
        Tag::MARKER => tag::tokenize(cur, chained),
        _ => None,
    }
}

/// Parses a verbatim text run into text, wikilink and tag nodes.
pub fn parse_inline(source: &str, span: Span) -> Vec<Node> {
    let mut builder = NodeBuilder::new(source);
    for segment in scan(source, span) {
        match segment {
            Segment::Text(span) => builder.text(span),
            Segment::Construct(tokens) => {
                for token in tokens {
                    builder.push(token);
                }
            }
        }
    }
    builder.finish()
}

/// Every token of every construct found in `s`.
pub fn tokenize(s: &str) -> Vec<Token> {
    scan(s, Span::new(0, s.len()))
        .into_iter()
        .flat_map(|segment| match segment {
            Segment::Construct(tokens) => tokens,
            Segment::Text(_) => vec![],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdast::{Tag as TagNode, WikiLink as WikiLinkNode};
    use pretty_assertions::assert_eq;

    fn inline(src: &str) -> Vec<Node> {
        parse_inline(src, Span::new(0, src.len()))
    }

    #[test]
    fn sentence_with_link_and_tag() {
        let src = "See [[notes/2024/plan.md|the plan]] and #work/urgent";
        assert_eq!(
            inline(src),
            vec![
                Node::text("See "),
                Node::WikiLink(WikiLinkNode::link("notes/2024/plan.md").with_alias("the plan")),
                Node::text(" and "),
                Node::Tag(TagNode::new("work/urgent")),
            ]
        );
    }

    #[test]
    fn failed_constructs_stay_text() {
        let src = "a [[b and #123 and c#d and ![x]";
        assert_eq!(inline(src), vec![Node::text(src)]);
    }

    #[test]
    fn chained_tags() {
        assert_eq!(
            inline("#a#b"),
            vec![Node::Tag(TagNode::new("a")), Node::Tag(TagNode::new("b"))]
        );
    }

    #[test]
    fn tag_after_link_is_not_chained() {
        let nodes = inline("[[x]]#y");
        assert_eq!(
            nodes,
            vec![Node::WikiLink(WikiLinkNode::link("x")), Node::text("#y")]
        );
    }

    #[test]
    fn bang_before_plain_link_text() {
        assert_eq!(
            inline("wow![[a.png]]"),
            vec![Node::text("wow"), Node::WikiLink(WikiLinkNode::embed("a.png"))]
        );
    }

    #[test]
    fn scan_respects_window() {
        let src = "xx #tag yy";
        let segments = scan(src, Span::new(3, 7));
        assert_eq!(
            segments,
            vec![Segment::Construct(vec![
                Token::new(TokenKind::TagMarker, Span::new(3, 4)),
                Token::new(TokenKind::TagContent, Span::new(4, 7)),
            ])]
        );
    }

    #[test]
    fn multibyte_text_around_constructs() {
        assert_eq!(
            inline("日記 #タグx [[ページ]]"),
            vec![
                Node::text("日記 #タグx "),
                Node::WikiLink(WikiLinkNode::link("ページ")),
            ]
        );
    }

    #[test]
    fn tokenize_collects_all_constructs() {
        let src = "See [[notes/2024/plan.md|the plan]] and #work/urgent";
        let tokens = tokenize(src);
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::OpenMarker,
                TokenKind::Path,
                TokenKind::AliasMarker,
                TokenKind::Alias,
                TokenKind::CloseMarker,
                TokenKind::TagMarker,
                TokenKind::TagContent,
            ]
        );
        assert_eq!(tokens[1].text(src), "notes/2024/plan.md");
        assert_eq!(tokens[6].text(src), "work/urgent");
    }
}
