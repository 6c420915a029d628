//! # Document-Model Bridge
//!
//! Converts between the markdown AST and the editor tree in both directions.
//!
//! ```text
//! markdown ──parse──▶ Root ──mdast_to_editor──▶ [EditorNode]
//!    ▲                                              │
//!    └──to_markdown── Root ◀──editor_to_mdast───────┘
//! ```
//!
//! Inline formatting nodes become marks on text leaves going forward and are
//! re-nested coming back. Images are normalized into galleries only on the
//! editor side.

mod from_editor;
pub mod images;
pub mod note_link;
mod to_editor;

use crate::{
    editor::{EditorNode, ElementKind, Marks},
    mdast::{Root, to_markdown},
    parsing::parse_markdown,
};

use from_editor::FromEditor;
use to_editor::ToEditor;

pub const DEFAULT_ASSET_SCHEME: &str = "chronicles://";

pub const DEFAULT_MAX_HEADING_DEPTH: u8 = 3;

/// File extensions treated as video when they appear on an image url.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "3g2", "3gp", "aaf", "asf", "avchd", "avi", "drc", "flv", "m2v", "m3u8", "m4p", "m4v", "mkv",
    "mng", "mov", "mp2", "mp4", "mpe", "mpeg", "mpg", "mpv", "mxf", "nsv", "ogg", "ogv", "qt",
    "rm", "rmvb", "roq", "svi", "vob", "webm", "wmv", "yuv",
];

/// Settings shared by both directions of the transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Prefix given to local image urls in the editor.
    pub asset_scheme: String,
    pub video_extensions: Vec<String>,
    /// Deeper headings are clamped to this depth.
    pub max_heading_depth: u8,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            asset_scheme: DEFAULT_ASSET_SCHEME.to_string(),
            video_extensions: VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_heading_depth: DEFAULT_MAX_HEADING_DEPTH,
        }
    }
}

pub fn mdast_to_editor(root: &Root, opts: &TransformOptions) -> Vec<EditorNode> {
    let nodes = ToEditor::new(opts).nodes(&root.children, Marks::default());
    let nodes = images::normalize_media(nodes);
    if nodes.is_empty() {
        return vec![EditorNode::element(ElementKind::Paragraph, vec![])];
    }
    nodes
}

pub fn editor_to_mdast(nodes: &[EditorNode], opts: &TransformOptions) -> Root {
    Root {
        children: FromEditor::new(opts).nodes(nodes),
    }
}

/// Parses markdown straight into editor nodes.
pub fn string_to_editor(markdown: &str, opts: &TransformOptions) -> Vec<EditorNode> {
    mdast_to_editor(&parse_markdown(markdown), opts)
}

/// Renders editor nodes as markdown.
pub fn editor_to_string(nodes: &[EditorNode], opts: &TransformOptions) -> String {
    to_markdown(&editor_to_mdast(nodes, opts))
}
