//! # Editor Document Model
//!
//! The rich-text tree the editor works on, serde-compatible with its JSON:
//! elements are `{"type": "p", "children": [...]}` and text leaves are
//! `{"text": "x", "bold": true}`.
//!
//! Every element has at least one child. Void elements (images, breaks,
//! wikilinks, tags) carry a single empty text leaf.

use serde::{Deserialize, Serialize};

use crate::mdast::AlignKind;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Invalid editor document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditorNode {
    Text(TextLeaf),
    Element(Element),
}

impl EditorNode {
    pub fn text(text: impl Into<String>) -> Self {
        EditorNode::Text(TextLeaf::new(text))
    }

    pub fn empty_text() -> Self {
        EditorNode::Text(TextLeaf::default())
    }

    pub fn element(kind: ElementKind, children: Vec<EditorNode>) -> Self {
        EditorNode::Element(Element::new(kind, children))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            EditorNode::Element(element) => Some(element),
            EditorNode::Text(_) => None,
        }
    }

    /// Concatenated text of all leaves below this node.
    pub fn plain_text(&self) -> String {
        match self {
            EditorNode::Text(leaf) => leaf.text.clone(),
            EditorNode::Element(element) => element.plain_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextLeaf {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

/// Independent formatting flags on a text leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Marks {
    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }

    pub fn without(mut self, mark: Mark) -> Self {
        self.set(mark, false);
        self
    }

    pub fn has(self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Strikethrough => self.strikethrough,
            Mark::Code => self.code,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Marks::default()
    }

    fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Strikethrough => self.strikethrough = on,
            Mark::Code => self.code = on,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Strikethrough,
    Code,
}

impl Mark {
    /// Marks that wrap other content, in tie-break order.
    pub const WRAPPERS: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Strikethrough];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<EditorNode>,
}

impl Element {
    /// An element with `children`, or a single empty leaf if there are none.
    pub fn new(kind: ElementKind, children: Vec<EditorNode>) -> Self {
        let children = if children.is_empty() {
            vec![EditorNode::empty_text()]
        } else {
            children
        };
        Self { kind, children }
    }

    pub fn void(kind: ElementKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn plain_text(&self) -> String {
        self.children.iter().map(EditorNode::plain_text).collect()
    }

    /// Restores the non-empty children invariant throughout the subtree.
    fn ensure_children(&mut self) {
        if self.children.is_empty() {
            self.children.push(EditorNode::empty_text());
        }
        for child in &mut self.children {
            if let EditorNode::Element(element) = child {
                element.ensure_children();
            }
        }
    }
}

/// Image and video attributes. `caption` mirrors the alt text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Vec<TextLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementKind {
    #[serde(rename = "p")]
    Paragraph,
    #[serde(rename = "h1")]
    H1,
    #[serde(rename = "h2")]
    H2,
    #[serde(rename = "h3")]
    H3,
    #[serde(rename = "h4")]
    H4,
    #[serde(rename = "h5")]
    H5,
    #[serde(rename = "h6")]
    H6,
    #[serde(rename = "thematicBreak")]
    ThematicBreak,
    #[serde(rename = "blockquote")]
    Blockquote,
    #[serde(rename = "ul")]
    BulletedList {
        #[serde(default)]
        spread: bool,
    },
    #[serde(rename = "ol")]
    NumberedList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        #[serde(default)]
        spread: bool,
    },
    #[serde(rename = "li")]
    ListItem {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        #[serde(default)]
        spread: bool,
    },
    /// Inline content of a list item.
    #[serde(rename = "lic")]
    ListItemContent,
    #[serde(rename = "table")]
    Table {
        #[serde(default)]
        align: Vec<AlignKind>,
    },
    #[serde(rename = "tableRow")]
    TableRow,
    #[serde(rename = "tableCell")]
    TableCell,
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "code_block")]
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<String>,
    },
    #[serde(rename = "code_line")]
    CodeLine,
    #[serde(rename = "footnoteDefinition")]
    FootnoteDefinition { identifier: String },
    #[serde(rename = "footnoteReference")]
    FootnoteReference { identifier: String },
    #[serde(rename = "break")]
    Break,
    #[serde(rename = "a")]
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// A link to another note, `../<journal>/<noteId>.md` in markdown.
    #[serde(rename = "noteLinkElement")]
    NoteLink {
        #[serde(rename = "noteId")]
        note_id: String,
        #[serde(rename = "journalName")]
        journal_name: String,
        #[serde(default)]
        title: String,
    },
    #[serde(rename = "img")]
    Image(Media),
    #[serde(rename = "video")]
    Video(Media),
    /// Two or more adjacent images or videos shown as a gallery.
    #[serde(rename = "imageGroupElement")]
    ImageGroup {
        #[serde(default)]
        title: String,
    },
    #[serde(rename = "wikiLink")]
    WikiLink {
        url: String,
        #[serde(default)]
        hash: String,
        value: String,
        #[serde(default)]
        embed: bool,
    },
    #[serde(rename = "tag")]
    Tag { value: String },
    /// Any element type this model does not know.
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl ElementKind {
    pub fn heading(depth: u8) -> Self {
        match depth {
            0 | 1 => ElementKind::H1,
            2 => ElementKind::H2,
            3 => ElementKind::H3,
            4 => ElementKind::H4,
            5 => ElementKind::H5,
            _ => ElementKind::H6,
        }
    }

    pub fn heading_depth(&self) -> Option<u8> {
        match self {
            ElementKind::H1 => Some(1),
            ElementKind::H2 => Some(2),
            ElementKind::H3 => Some(3),
            ElementKind::H4 => Some(4),
            ElementKind::H5 => Some(5),
            ElementKind::H6 => Some(6),
            _ => None,
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(self, ElementKind::Image(_) | ElementKind::Video(_))
    }
}

pub fn to_json(nodes: &[EditorNode]) -> Result<String, EditorError> {
    Ok(serde_json::to_string_pretty(nodes)?)
}

/// Parses editor JSON. Unknown element types deserialize as
/// [`ElementKind::Unknown`]; elements without children get an empty leaf.
pub fn from_json(json: &str) -> Result<Vec<EditorNode>, EditorError> {
    let mut nodes: Vec<EditorNode> = serde_json::from_str(json)?;
    for node in &mut nodes {
        if let EditorNode::Element(element) = node {
            element.ensure_children();
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_leaf_marks_are_flat() {
        let leaf = TextLeaf::with_marks("x", Marks::default().with(Mark::Bold));
        assert_eq!(
            serde_json::to_value(&leaf).unwrap(),
            json!({"text": "x", "bold": true})
        );
    }

    #[test]
    fn element_json_shape() {
        let node = EditorNode::element(
            ElementKind::NumberedList {
                start: Some(3),
                spread: false,
            },
            vec![],
        );
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "ol", "start": 3, "spread": false, "children": [{"text": ""}]})
        );
    }

    #[test]
    fn media_json_shape() {
        let node = EditorNode::Element(Element::void(ElementKind::Image(Media {
            url: "chronicles://a.png".into(),
            title: None,
            alt: Some("cat".into()),
            caption: vec![TextLeaf::new("cat")],
        })));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "img",
                "url": "chronicles://a.png",
                "alt": "cat",
                "caption": [{"text": "cat"}],
                "children": [{"text": ""}]
            })
        );
    }

    #[test]
    fn parses_editor_json() {
        let json = r#"[
            {"type": "h2", "children": [{"text": "Title", "italic": true}]},
            {"type": "noteLinkElement", "noteId": "abc", "journalName": "work",
             "title": "", "url": "../work/abc.md", "children": [{"text": "see"}]}
        ]"#;
        let nodes = from_json(json).unwrap();
        assert_eq!(
            nodes,
            vec![
                EditorNode::element(
                    ElementKind::H2,
                    vec![EditorNode::Text(TextLeaf::with_marks(
                        "Title",
                        Marks::default().with(Mark::Italic)
                    ))]
                ),
                EditorNode::element(
                    ElementKind::NoteLink {
                        note_id: "abc".into(),
                        journal_name: "work".into(),
                        title: String::new(),
                    },
                    vec![EditorNode::text("see")]
                ),
            ]
        );
    }

    #[test]
    fn unknown_types_do_not_fail() {
        let nodes = from_json(r#"[{"type": "callout", "children": [{"text": "hi"}]}]"#).unwrap();
        assert_eq!(
            nodes,
            vec![EditorNode::element(
                ElementKind::Unknown,
                vec![EditorNode::text("hi")]
            )]
        );
    }

    #[test]
    fn missing_children_get_an_empty_leaf() {
        let nodes = from_json(r#"[{"type": "p"}]"#).unwrap();
        assert_eq!(
            nodes,
            vec![EditorNode::element(ElementKind::Paragraph, vec![])]
        );
        assert_eq!(nodes[0].as_element().unwrap().children.len(), 1);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(from_json("{"), Err(EditorError::Json(_))));
    }

    #[test]
    fn json_round_trip() {
        let nodes = vec![EditorNode::element(
            ElementKind::Paragraph,
            vec![
                EditorNode::text("a "),
                EditorNode::Element(Element::void(ElementKind::WikiLink {
                    url: "b.md".into(),
                    hash: String::new(),
                    value: "b".into(),
                    embed: false,
                })),
            ],
        )];
        let json = to_json(&nodes).unwrap();
        assert_eq!(from_json(&json).unwrap(), nodes);
    }
}
