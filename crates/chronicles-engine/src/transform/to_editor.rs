use crate::{
    editor::{EditorNode, Element, ElementKind, Mark, Marks, Media, TextLeaf},
    mdast::Node,
};

use super::{
    TransformOptions,
    images::{is_video, prefix_url},
    note_link::parse_note_link,
};

/// Markdown AST to editor nodes. Emphasis, strong, delete and inline code
/// become marks on the text leaves beneath them.
pub(crate) struct ToEditor<'o> {
    opts: &'o TransformOptions,
}

impl<'o> ToEditor<'o> {
    pub(crate) fn new(opts: &'o TransformOptions) -> Self {
        Self { opts }
    }

    pub(crate) fn nodes(&self, nodes: &[Node], marks: Marks) -> Vec<EditorNode> {
        nodes.iter().flat_map(|n| self.node(n, marks)).collect()
    }

    fn element(&self, kind: ElementKind, children: &[Node], marks: Marks) -> Vec<EditorNode> {
        vec![EditorNode::element(kind, self.nodes(children, marks))]
    }

    fn void(kind: ElementKind) -> Vec<EditorNode> {
        vec![EditorNode::Element(Element::void(kind))]
    }

    fn node(&self, node: &Node, marks: Marks) -> Vec<EditorNode> {
        match node {
            Node::Paragraph { children } => self.element(ElementKind::Paragraph, children, marks),
            Node::Heading { depth, children } => {
                let depth = (*depth).min(self.opts.max_heading_depth);
                self.element(ElementKind::heading(depth), children, marks)
            }
            Node::ThematicBreak => Self::void(ElementKind::ThematicBreak),
            Node::Blockquote { children } => self.element(ElementKind::Blockquote, children, marks),
            Node::List {
                ordered,
                start,
                spread,
                children,
            } => {
                let kind = if *ordered {
                    ElementKind::NumberedList {
                        start: *start,
                        spread: *spread,
                    }
                } else {
                    ElementKind::BulletedList { spread: *spread }
                };
                self.element(kind, children, marks)
            }
            Node::ListItem {
                checked,
                spread,
                children,
            } => {
                // paragraphs directly inside an item are list item content
                let children = children
                    .iter()
                    .flat_map(|child| match child {
                        Node::Paragraph { children } => {
                            self.element(ElementKind::ListItemContent, children, marks)
                        }
                        other => self.node(other, marks),
                    })
                    .collect();
                vec![EditorNode::element(
                    ElementKind::ListItem {
                        checked: *checked,
                        spread: *spread,
                    },
                    children,
                )]
            }
            Node::Table { align, children } => self.element(
                ElementKind::Table {
                    align: align.clone(),
                },
                children,
                marks,
            ),
            Node::TableRow { children } => self.element(ElementKind::TableRow, children, marks),
            Node::TableCell { children } => self.element(ElementKind::TableCell, children, marks),
            Node::Html { value } => vec![EditorNode::element(
                ElementKind::Html,
                vec![EditorNode::text(value.clone())],
            )],
            Node::Code { lang, meta, value } => {
                let lines = value
                    .split('\n')
                    .map(|line| {
                        EditorNode::element(ElementKind::CodeLine, vec![EditorNode::text(line)])
                    })
                    .collect();
                vec![EditorNode::element(
                    ElementKind::CodeBlock {
                        lang: lang.clone(),
                        meta: meta.clone(),
                    },
                    lines,
                )]
            }
            Node::FootnoteDefinition {
                identifier,
                children,
            } => self.element(
                ElementKind::FootnoteDefinition {
                    identifier: identifier.clone(),
                },
                children,
                marks,
            ),
            Node::Text { value } => vec![EditorNode::Text(TextLeaf::with_marks(
                value.clone(),
                marks,
            ))],
            Node::Emphasis { children } => self.nodes(children, marks.with(Mark::Italic)),
            Node::Strong { children } => self.nodes(children, marks.with(Mark::Bold)),
            Node::Delete { children } => self.nodes(children, marks.with(Mark::Strikethrough)),
            Node::InlineCode { value } => vec![EditorNode::Text(TextLeaf::with_marks(
                value.clone(),
                marks.with(Mark::Code),
            ))],
            Node::Break => Self::void(ElementKind::Break),
            Node::Link {
                url,
                title,
                children,
            } => {
                let kind = match parse_note_link(url) {
                    Some(target) => ElementKind::NoteLink {
                        note_id: target.note_id,
                        journal_name: target.journal_name,
                        title: String::new(),
                    },
                    None => ElementKind::Link {
                        url: url.clone(),
                        title: title.clone(),
                    },
                };
                self.element(kind, children, marks)
            }
            Node::Image { url, title, alt } => vec![self.media(url, title.as_deref(), alt)],
            Node::FootnoteReference { identifier } => {
                Self::void(ElementKind::FootnoteReference {
                    identifier: identifier.clone(),
                })
            }
            Node::WikiLink(link) => Self::void(ElementKind::WikiLink {
                url: link.url.clone(),
                hash: link.hash.clone(),
                value: link.value.clone(),
                embed: link.is_embed(),
            }),
            Node::Tag(tag) => Self::void(ElementKind::Tag {
                value: tag.value.clone(),
            }),
        }
    }

    /// Images whose extension is a video format become videos; either way
    /// the url gets the asset scheme and the caption mirrors the alt text.
    fn media(&self, url: &str, title: Option<&str>, alt: &str) -> EditorNode {
        let media = Media {
            url: prefix_url(url, &self.opts.asset_scheme),
            title: title.map(str::to_string),
            alt: (!alt.is_empty()).then(|| alt.to_string()),
            caption: vec![TextLeaf::new(alt)],
        };
        let kind = if is_video(url, &self.opts.video_extensions) {
            ElementKind::Video(media)
        } else {
            ElementKind::Image(media)
        };
        EditorNode::Element(Element::void(kind))
    }
}
