//! Assembles the markdown AST from pulldown-cmark's offset event stream.
//!
//! # Event Flow
//!
//! pulldown-cmark reports structure as `Start(tag)` / `End(tag)` pairs with
//! leaf events in between. [`TreeBuilder`] keeps one [`Frame`] per open
//! container; leaves land in the top frame and a frame becomes a node when
//! its `End` arrives.
//!
//! Tight list items have no paragraph events:
//! ```markdown
//! - Item 1
//! ```
//! Events: `Start(List)`, `Start(Item)`, `Text("Item 1")`, `End(Item)`,
//! `End(List)`. The builder opens an implicit paragraph for such inline
//! content and closes it at the next block start or at `End(Item)`.
//!
//! # Text Runs
//!
//! pulldown-cmark splits text at every character it considered as syntax,
//! so `[[a]]` arrives as several `Text` events. Consecutive events whose
//! source ranges touch and whose text is the unescaped source slice are
//! joined into one run and scanned for wikilinks and tags as a whole. Any
//! other text (escapes, entities, image alt text) is taken literally.

use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag};

use crate::{
    mdast::{AlignKind, Node, Root},
    parsing::{inline::parse_inline, span::Span},
};

/// The markdown extensions the dialect is written in.
pub fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Parses markdown into the AST. Never fails: anything the AST cannot
/// represent degrades to text.
pub fn parse_markdown(source: &str) -> Root {
    let mut builder = TreeBuilder::new(source);
    for (event, range) in Parser::new_ext(source, options()).into_offset_iter() {
        builder.event(event, range);
    }
    builder.finish()
}

#[derive(Debug)]
enum FrameKind {
    Root,
    Paragraph,
    /// Paragraph opened for the bare inline content of a tight list item.
    ImplicitParagraph,
    Heading(u8),
    Blockquote,
    List {
        ordered: bool,
        start: Option<u64>,
    },
    Item {
        checked: Option<bool>,
        loose: bool,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    HtmlBlock(String),
    Table(Vec<AlignKind>),
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Delete,
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
    },
    FootnoteDefinition(String),
    /// A container with no AST counterpart; its children go to the parent.
    Unsupported,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    fn into_nodes(self) -> Vec<Node> {
        let children = self.children;
        let node = match self.kind {
            FrameKind::Root | FrameKind::Unsupported => return children,
            FrameKind::Paragraph | FrameKind::ImplicitParagraph => Node::Paragraph { children },
            FrameKind::Heading(depth) => Node::Heading { depth, children },
            FrameKind::Blockquote => Node::Blockquote { children },
            FrameKind::List { ordered, start } => {
                let spread = children
                    .iter()
                    .any(|c| matches!(c, Node::ListItem { spread: true, .. }));
                Node::List {
                    ordered,
                    start,
                    spread,
                    children,
                }
            }
            FrameKind::Item { checked, loose } => Node::ListItem {
                checked,
                spread: loose,
                children,
            },
            FrameKind::Code {
                lang,
                meta,
                mut value,
            } => {
                if value.ends_with('\n') {
                    value.pop();
                }
                Node::Code { lang, meta, value }
            }
            FrameKind::HtmlBlock(value) => Node::Html {
                value: value.trim_end_matches('\n').to_string(),
            },
            FrameKind::Table(align) => Node::Table { align, children },
            FrameKind::TableHead | FrameKind::TableRow => Node::TableRow { children },
            FrameKind::TableCell => Node::TableCell { children },
            FrameKind::Emphasis => Node::Emphasis { children },
            FrameKind::Strong => Node::Strong { children },
            FrameKind::Delete => Node::Delete { children },
            FrameKind::Link { url, title } => Node::Link {
                url,
                title,
                children,
            },
            FrameKind::Image { url, title } => Node::Image {
                url,
                title,
                alt: children.iter().map(Node::plain_text).collect(),
            },
            FrameKind::FootnoteDefinition(identifier) => Node::FootnoteDefinition {
                identifier,
                children,
            },
        };
        vec![node]
    }
}

struct TreeBuilder<'s> {
    source: &'s str,
    stack: Vec<Frame>,
    /// Verbatim text waiting to be scanned for inline constructs.
    run: Option<Span>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            stack: vec![Frame::new(FrameKind::Root)],
            run: None,
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        if !matches!(event, Event::Text(_)) {
            self.flush_run();
        }
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => {
                self.close_implicit();
                self.close_frame();
            }
            Event::Text(text) => self.text(&text, range),
            Event::Code(code) => self.inline(Node::InlineCode {
                value: code.to_string(),
            }),
            Event::InlineHtml(html) => self.inline(Node::Html {
                value: html.to_string(),
            }),
            Event::Html(html) => self.html(&html),
            Event::SoftBreak => self.inline(Node::text("\n")),
            Event::HardBreak => self.inline(Node::Break),
            Event::Rule => {
                self.close_implicit();
                self.push_node(Node::ThematicBreak);
            }
            Event::FootnoteReference(label) => self.inline(Node::FootnoteReference {
                identifier: label.to_string(),
            }),
            Event::TaskListMarker(checked) => self.task_marker(checked),
            other => {
                log::debug!("unsupported markdown event degraded to text: {other:?}");
                let slice = self.source.get(range).unwrap_or_default();
                self.inline(Node::text(slice));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.close_implicit();
                if let Some(FrameKind::Item { loose, .. }) = self.top_kind_mut() {
                    *loose = true;
                }
                self.push_frame(FrameKind::Paragraph);
            }
            Tag::Heading { level, .. } => self.open_block(FrameKind::Heading(level as u8)),
            Tag::BlockQuote(_) => self.open_block(FrameKind::Blockquote),
            Tag::CodeBlock(kind) => {
                let (lang, meta) = match kind {
                    CodeBlockKind::Fenced(info) => split_info(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                self.open_block(FrameKind::Code {
                    lang,
                    meta,
                    value: String::new(),
                });
            }
            Tag::HtmlBlock => self.open_block(FrameKind::HtmlBlock(String::new())),
            Tag::List(start) => self.open_block(FrameKind::List {
                ordered: start.is_some(),
                start,
            }),
            Tag::Item => self.open_block(FrameKind::Item {
                checked: None,
                loose: false,
            }),
            Tag::FootnoteDefinition(label) => {
                self.open_block(FrameKind::FootnoteDefinition(label.to_string()))
            }
            Tag::Table(alignments) => self.open_block(FrameKind::Table(
                alignments.iter().map(align_kind).collect(),
            )),
            Tag::TableHead => self.push_frame(FrameKind::TableHead),
            Tag::TableRow => self.push_frame(FrameKind::TableRow),
            Tag::TableCell => self.push_frame(FrameKind::TableCell),
            Tag::Emphasis => self.open_inline(FrameKind::Emphasis),
            Tag::Strong => self.open_inline(FrameKind::Strong),
            Tag::Strikethrough => self.open_inline(FrameKind::Delete),
            Tag::Link {
                dest_url, title, ..
            } => self.open_inline(FrameKind::Link {
                url: dest_url.to_string(),
                title: non_empty(&title),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.open_inline(FrameKind::Image {
                url: dest_url.to_string(),
                title: non_empty(&title),
            }),
            other => {
                log::debug!("unsupported markdown container flattened: {other:?}");
                self.push_frame(FrameKind::Unsupported);
            }
        }
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        if let Some(FrameKind::Code { value, .. } | FrameKind::HtmlBlock(value)) =
            self.top_kind_mut()
        {
            value.push_str(text);
            return;
        }
        self.ensure_paragraph();

        if self.in_image() || !self.is_verbatim(text, &range) {
            self.flush_run();
            self.push_node(Node::text(text));
            return;
        }

        let extends = self.run.is_some_and(|run| run.end == range.start);
        if extends {
            if let Some(run) = &mut self.run {
                run.end = range.end;
            }
        } else {
            self.flush_run();
            self.run = Some(Span::new(range.start, range.end));
        }
    }

    fn html(&mut self, html: &str) {
        if let Some(FrameKind::HtmlBlock(value)) = self.top_kind_mut() {
            value.push_str(html);
            return;
        }
        self.close_implicit();
        self.push_node(Node::Html {
            value: html.trim_end_matches('\n').to_string(),
        });
    }

    fn task_marker(&mut self, checked: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let FrameKind::Item { checked: slot, .. } = &mut frame.kind {
                *slot = Some(checked);
                return;
            }
        }
    }

    /// True when `text` is exactly its unescaped source slice.
    fn is_verbatim(&self, text: &str, range: &Range<usize>) -> bool {
        let before = self
            .source
            .as_bytes()
            .get(..range.start)
            .unwrap_or_default();
        let backslashes = before.iter().rev().take_while(|&&b| b == b'\\').count();
        backslashes % 2 == 0 && self.source.get(range.clone()) == Some(text)
    }

    fn in_image(&self) -> bool {
        self.stack
            .iter()
            .any(|f| matches!(f.kind, FrameKind::Image { .. }))
    }

    fn flush_run(&mut self) {
        if let Some(run) = self.run.take() {
            for node in parse_inline(self.source, run) {
                self.push_node(node);
            }
        }
    }

    fn top_kind_mut(&mut self) -> Option<&mut FrameKind> {
        self.stack.last_mut().map(|f| &mut f.kind)
    }

    fn push_frame(&mut self, kind: FrameKind) {
        self.stack.push(Frame::new(kind));
    }

    fn open_block(&mut self, kind: FrameKind) {
        self.close_implicit();
        self.push_frame(kind);
    }

    fn open_inline(&mut self, kind: FrameKind) {
        self.ensure_paragraph();
        self.push_frame(kind);
    }

    fn inline(&mut self, node: Node) {
        self.ensure_paragraph();
        self.push_node(node);
    }

    fn ensure_paragraph(&mut self) {
        if matches!(self.top_kind_mut(), Some(FrameKind::Item { .. })) {
            self.push_frame(FrameKind::ImplicitParagraph);
        }
    }

    fn close_implicit(&mut self) {
        if matches!(self.top_kind_mut(), Some(FrameKind::ImplicitParagraph)) {
            self.close_frame();
        }
    }

    fn close_frame(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            for node in frame.into_nodes() {
                self.push_node(node);
            }
        }
    }

    /// Appends to the top frame, merging adjacent text.
    fn push_node(&mut self, node: Node) {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if let (Some(Node::Text { value }), Node::Text { value: more }) =
            (top.children.last_mut(), &node)
        {
            value.push_str(more);
            return;
        }
        top.children.push(node);
    }

    fn finish(mut self) -> Root {
        self.flush_run();
        while self.stack.len() > 1 {
            self.close_frame();
        }
        let children = self
            .stack
            .pop()
            .map(|root| root.children)
            .unwrap_or_default();
        Root { children }
    }
}

/// Splits a fence info string into language and meta.
fn split_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_string()), non_empty(meta.trim())),
        None => (non_empty(info), None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn align_kind(alignment: &Alignment) -> AlignKind {
    match alignment {
        Alignment::None => AlignKind::None,
        Alignment::Left => AlignKind::Left,
        Alignment::Center => AlignKind::Center,
        Alignment::Right => AlignKind::Right,
    }
}
