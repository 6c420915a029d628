use crate::{
    editor::{EditorNode, Element, ElementKind, Mark, Media, TextLeaf},
    mdast::{LinkKind, Node, Tag, WikiLink},
};

use super::{TransformOptions, images::unprefix_url, note_link::note_link_url};

/// Editor nodes to markdown AST.
pub(crate) struct FromEditor<'o> {
    opts: &'o TransformOptions,
}

impl<'o> FromEditor<'o> {
    pub(crate) fn new(opts: &'o TransformOptions) -> Self {
        Self { opts }
    }

    /// Converts a sibling list. Consecutive text leaves are re-nested into
    /// formatting nodes as one run.
    pub(crate) fn nodes(&self, nodes: &[EditorNode]) -> Vec<Node> {
        let mut out = Vec::new();
        let mut run = Vec::new();
        for node in nodes {
            match node {
                EditorNode::Text(leaf) => run.push(leaf.clone()),
                EditorNode::Element(element) => {
                    out.extend(nest_marks(std::mem::take(&mut run)));
                    out.extend(self.element(element));
                }
            }
        }
        out.extend(nest_marks(run));
        merge_inline(out)
    }

    fn element(&self, element: &Element) -> Vec<Node> {
        let children = || self.nodes(&element.children);
        let node = match &element.kind {
            ElementKind::Paragraph | ElementKind::ListItemContent => Node::Paragraph {
                children: children(),
            },
            kind @ (ElementKind::H1
            | ElementKind::H2
            | ElementKind::H3
            | ElementKind::H4
            | ElementKind::H5
            | ElementKind::H6) => Node::Heading {
                depth: kind
                    .heading_depth()
                    .unwrap_or(1)
                    .min(self.opts.max_heading_depth.max(1)),
                children: children(),
            },
            ElementKind::ThematicBreak => Node::ThematicBreak,
            ElementKind::Blockquote => Node::Blockquote {
                children: children(),
            },
            ElementKind::BulletedList { spread } => Node::List {
                ordered: false,
                start: None,
                spread: *spread,
                children: children(),
            },
            ElementKind::NumberedList { start, spread } => Node::List {
                ordered: true,
                start: *start,
                spread: *spread,
                children: children(),
            },
            ElementKind::ListItem { checked, spread } => Node::ListItem {
                checked: *checked,
                spread: *spread,
                children: children(),
            },
            ElementKind::Table { align } => Node::Table {
                align: align.clone(),
                children: children(),
            },
            ElementKind::TableRow => Node::TableRow {
                children: children(),
            },
            ElementKind::TableCell => Node::TableCell {
                children: children(),
            },
            ElementKind::Html => Node::Html {
                value: element.plain_text(),
            },
            ElementKind::CodeBlock { lang, meta } => Node::Code {
                lang: lang.clone(),
                meta: meta.clone(),
                value: element
                    .children
                    .iter()
                    .map(EditorNode::plain_text)
                    .collect::<Vec<_>>()
                    .join("\n"),
            },
            ElementKind::CodeLine => Node::text(element.plain_text()),
            ElementKind::FootnoteDefinition { identifier } => Node::FootnoteDefinition {
                identifier: identifier.clone(),
                children: children(),
            },
            ElementKind::FootnoteReference { identifier } => Node::FootnoteReference {
                identifier: identifier.clone(),
            },
            ElementKind::Break => Node::Break,
            ElementKind::Link { url, title } => Node::Link {
                url: url.clone(),
                title: title.clone(),
                children: children(),
            },
            ElementKind::NoteLink {
                note_id,
                journal_name,
                title,
            } => Node::Link {
                url: note_link_url(journal_name, note_id),
                title: (!title.is_empty()).then(|| title.clone()),
                children: children(),
            },
            ElementKind::Image(media) | ElementKind::Video(media) => self.image(media),
            // the gallery exists only in the editor; its images become siblings
            ElementKind::ImageGroup { .. } => return children(),
            ElementKind::WikiLink {
                url,
                hash,
                value,
                embed,
            } => {
                let kind = if *embed {
                    LinkKind::Embed
                } else {
                    LinkKind::Link
                };
                Node::WikiLink(
                    WikiLink::new(kind, url.clone())
                        .with_hash(hash.clone())
                        .with_alias(value.clone()),
                )
            }
            ElementKind::Tag { value } => Node::Tag(Tag::new(value.clone())),
            ElementKind::Unknown => {
                let text = element.plain_text();
                log::warn!("unknown editor element replaced by its text ({} bytes)", text.len());
                return if text.is_empty() {
                    vec![]
                } else {
                    vec![Node::text(text)]
                };
            }
        };
        vec![node]
    }

    fn image(&self, media: &Media) -> Node {
        let caption: String = media.caption.iter().map(|leaf| leaf.text.as_str()).collect();
        let alt = if caption.is_empty() {
            media.alt.clone().unwrap_or_default()
        } else {
            caption
        };
        Node::Image {
            url: unprefix_url(&media.url, &self.opts.asset_scheme).to_string(),
            title: media.title.clone(),
            alt,
        }
    }
}

/// Re-nests a run of marked text leaves into formatting nodes.
///
/// At each position the wrapper mark shared by the longest stretch of
/// following leaves becomes the outer node, so `[b:"x", bi:"y", b:"z"]`
/// yields `Strong[x, Emphasis[y], z]` rather than three siblings. Whitespace
/// at the edges of a wrapper moves outside it, since `** x**` is not strong
/// text in markdown.
pub(crate) fn nest_marks(leaves: Vec<TextLeaf>) -> Vec<Node> {
    let leaves: Vec<TextLeaf> = leaves.into_iter().filter(|l| !l.text.is_empty()).collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < leaves.len() {
        let marks = leaves[i].marks;
        let mut best: Option<(Mark, usize)> = None;
        for mark in Mark::WRAPPERS {
            if !marks.has(mark) {
                continue;
            }
            let len = leaves[i..]
                .iter()
                .take_while(|l| l.marks.has(mark))
                .count();
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((mark, len));
            }
        }

        match best {
            Some((mark, len)) => {
                let run = leaves[i..i + len]
                    .iter()
                    .map(|l| TextLeaf::with_marks(l.text.clone(), l.marks.without(mark)))
                    .collect();
                out.extend(wrap(mark, run));
                i += len;
            }
            None => {
                let leaf = &leaves[i];
                out.push(if leaf.marks.code {
                    Node::InlineCode {
                        value: leaf.text.clone(),
                    }
                } else {
                    Node::text(leaf.text.clone())
                });
                i += 1;
            }
        }
    }
    merge_inline(out)
}

fn wrap(mark: Mark, mut run: Vec<TextLeaf>) -> Vec<Node> {
    let mut before = String::new();
    while let Some(first) = run.first_mut() {
        if first.marks.code {
            break;
        }
        let trimmed = first.text.trim_start().to_string();
        before.push_str(&first.text[..first.text.len() - trimmed.len()]);
        if trimmed.is_empty() {
            run.remove(0);
        } else {
            first.text = trimmed;
            break;
        }
    }

    let mut after = String::new();
    while let Some(last) = run.last_mut() {
        if last.marks.code {
            break;
        }
        let trimmed = last.text.trim_end().to_string();
        after.insert_str(0, &last.text[trimmed.len()..]);
        if trimmed.is_empty() {
            run.pop();
        } else {
            last.text = trimmed;
            break;
        }
    }

    let mut out = Vec::with_capacity(3);
    if !before.is_empty() {
        out.push(Node::text(before));
    }
    if !run.is_empty() {
        let children = nest_marks(run);
        out.push(match mark {
            Mark::Bold => Node::Strong { children },
            Mark::Italic => Node::Emphasis { children },
            Mark::Strikethrough => Node::Delete { children },
            Mark::Code => Node::InlineCode {
                value: children.iter().map(Node::plain_text).collect(),
            },
        });
    }
    if !after.is_empty() {
        out.push(Node::text(after));
    }
    out
}

/// Merges adjacent text, adjacent inline code and adjacent wrappers of one
/// kind; drops empty text.
fn merge_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = match (out.last_mut(), node) {
            (_, Node::Text { value }) if value.is_empty() => continue,
            (Some(Node::Text { value }), Node::Text { value: more }) => {
                value.push_str(&more);
                continue;
            }
            (Some(Node::InlineCode { value }), Node::InlineCode { value: more }) => {
                value.push_str(&more);
                continue;
            }
            (Some(Node::Strong { children }), Node::Strong { children: more })
            | (Some(Node::Emphasis { children }), Node::Emphasis { children: more })
            | (Some(Node::Delete { children }), Node::Delete { children: more }) => {
                let mut merged = std::mem::take(children);
                merged.extend(more);
                *children = merge_inline(merged);
                continue;
            }
            (_, node) => node,
        };
        out.push(node);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Marks;
    use pretty_assertions::assert_eq;

    fn leaf(text: &str, marks: &[Mark]) -> TextLeaf {
        let marks = marks.iter().fold(Marks::default(), |m, &mark| m.with(mark));
        TextLeaf::with_marks(text, marks)
    }

    #[test]
    fn longest_shared_mark_is_outermost() {
        let leaves = vec![
            leaf("x", &[Mark::Bold]),
            leaf("y", &[Mark::Bold, Mark::Italic]),
            leaf("z", &[Mark::Bold]),
        ];
        assert_eq!(
            nest_marks(leaves),
            vec![Node::Strong {
                children: vec![
                    Node::text("x"),
                    Node::Emphasis {
                        children: vec![Node::text("y")]
                    },
                    Node::text("z"),
                ]
            }]
        );
    }

    #[test]
    fn whitespace_moves_outside_wrappers() {
        let leaves = vec![leaf("a", &[]), leaf(" bold ", &[Mark::Bold]), leaf("b", &[])];
        assert_eq!(
            nest_marks(leaves),
            vec![
                Node::text("a "),
                Node::Strong {
                    children: vec![Node::text("bold")]
                },
                Node::text(" b"),
            ]
        );
    }

    #[test]
    fn whitespace_only_wrapper_is_plain_text() {
        assert_eq!(
            nest_marks(vec![leaf("  ", &[Mark::Italic])]),
            vec![Node::text("  ")]
        );
    }

    #[test]
    fn code_inside_bold() {
        let leaves = vec![leaf("run ", &[Mark::Bold]), leaf("cmd", &[Mark::Bold, Mark::Code])];
        assert_eq!(
            nest_marks(leaves),
            vec![Node::Strong {
                children: vec![
                    Node::text("run "),
                    Node::InlineCode {
                        value: "cmd".into()
                    }
                ]
            }]
        );
    }

    #[test]
    fn adjacent_text_merges_and_empty_drops() {
        let leaves = vec![leaf("a", &[]), leaf("", &[Mark::Bold]), leaf("b", &[])];
        assert_eq!(nest_marks(leaves), vec![Node::text("ab")]);
    }

    #[test]
    fn unknown_elements_keep_their_text() {
        let opts = TransformOptions::default();
        let nodes = [EditorNode::element(
            ElementKind::Unknown,
            vec![EditorNode::text("kept")],
        )];
        assert_eq!(FromEditor::new(&opts).nodes(&nodes), vec![Node::text("kept")]);
    }

    #[test]
    fn image_group_flattens() {
        let opts = TransformOptions::default();
        let img = |url: &str| {
            EditorNode::Element(Element::void(ElementKind::Image(Media {
                url: format!("chronicles://{url}"),
                caption: vec![TextLeaf::new(url)],
                ..Media::default()
            })))
        };
        let nodes = [EditorNode::element(
            ElementKind::ImageGroup {
                title: String::new(),
            },
            vec![img("a.png"), img("b.png")],
        )];
        assert_eq!(
            FromEditor::new(&opts).nodes(&nodes),
            vec![Node::image("a.png", "a.png"), Node::image("b.png", "b.png")]
        );
    }

    #[test]
    fn note_link_becomes_relative_link() {
        let opts = TransformOptions::default();
        let nodes = [EditorNode::element(
            ElementKind::NoteLink {
                note_id: "n1".into(),
                journal_name: "work".into(),
                title: String::new(),
            },
            vec![EditorNode::text("plan")],
        )];
        assert_eq!(
            FromEditor::new(&opts).nodes(&nodes),
            vec![Node::Link {
                url: "../work/n1.md".into(),
                title: None,
                children: vec![Node::text("plan")],
            }]
        );
    }
}
