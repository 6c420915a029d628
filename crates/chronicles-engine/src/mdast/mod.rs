//! # Markdown AST
//!
//! A closed tree of markdown node kinds, including the dialect's wikilink,
//! embed and tag nodes. Produced by [`crate::parsing::parse_markdown`],
//! consumed by the serializer and the editor transform.
//!
//! ## Modules
//!
//! - **`to_markdown`**: renders nodes and whole documents back to markdown
//! - **`html`**: renders wikilinks and embeds to HTML fragments

pub mod html;
pub mod to_markdown;

use serde::{Deserialize, Serialize};

pub use to_markdown::{tag_to_markdown, to_markdown, wikilink_to_markdown};

/// A parsed markdown document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "root")]
pub struct Root {
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignKind {
    #[default]
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    // Blocks
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        depth: u8,
        children: Vec<Node>,
    },
    ThematicBreak,
    Blockquote {
        children: Vec<Node>,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        spread: bool,
        children: Vec<Node>,
    },
    ListItem {
        checked: Option<bool>,
        spread: bool,
        children: Vec<Node>,
    },
    Table {
        align: Vec<AlignKind>,
        children: Vec<Node>,
    },
    TableRow {
        children: Vec<Node>,
    },
    TableCell {
        children: Vec<Node>,
    },
    Html {
        value: String,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    FootnoteDefinition {
        identifier: String,
        children: Vec<Node>,
    },

    // Inlines
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Delete {
        children: Vec<Node>,
    },
    InlineCode {
        value: String,
    },
    Break,
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    FootnoteReference {
        identifier: String,
    },
    WikiLink(WikiLink),
    Tag(Tag),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Node::Image {
            url: url.into(),
            title: None,
            alt: alt.into(),
        }
    }

    /// Child nodes of container kinds; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::Blockquote { children }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Table { children, .. }
            | Node::TableRow { children }
            | Node::TableCell { children }
            | Node::FootnoteDefinition { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Delete { children }
            | Node::Link { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Node::Image { .. })
    }

    /// Concatenated text content, as a reader would see it.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { value } | Node::InlineCode { value } | Node::Code { value, .. } => {
                out.push_str(value)
            }
            Node::Break => out.push('\n'),
            Node::Image { alt, .. } => out.push_str(alt),
            Node::WikiLink(link) => out.push_str(&link.value),
            Node::Tag(tag) => {
                out.push('#');
                out.push_str(&tag.value);
            }
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    Link,
    Embed,
}

/// A `[[wikilink]]` or `![[embed]]`.
///
/// `value` is the display text: the alias when one was written, otherwise
/// [`default_display_value`] of `url`. Whether the node is an embed is fixed
/// at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiLink {
    kind: LinkKind,
    pub url: String,
    pub hash: String,
    pub value: String,
}

impl WikiLink {
    pub fn new(kind: LinkKind, url: impl Into<String>) -> Self {
        let url = url.into();
        let value = default_display_value(&url);
        Self {
            kind,
            url,
            hash: String::new(),
            value,
        }
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self::new(LinkKind::Link, url)
    }

    pub fn embed(url: impl Into<String>) -> Self {
        Self::new(LinkKind::Embed, url)
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.value = alias.into();
        self
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn is_embed(&self) -> bool {
        self.kind == LinkKind::Embed
    }

    /// True when `value` was written explicitly rather than derived from `url`.
    pub fn has_alias(&self) -> bool {
        self.value != default_display_value(&self.url)
    }
}

/// A `#tag`. `value` excludes the leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub value: String,
}

impl Tag {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Display text derived from a link target: the last `/` segment with the
/// extension (everything from its last `.`) removed.
pub fn default_display_value(url: &str) -> String {
    let file = url.rsplit('/').next().unwrap_or(url);
    match file.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file.to_string(),
    }
}
