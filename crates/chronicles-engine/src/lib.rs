//! Markdown dialect and editor-tree transforms for chronicles notes.
//!
//! - [`parsing`]: markdown text to [`mdast::Root`], with `[[wikilinks]]`,
//!   `![[embeds]]` and `#tags` recognized inside text runs
//! - [`mdast`]: the AST and its serialization back to markdown
//! - [`editor`]: the rich-text editor's document model
//! - [`transform`]: conversion between the AST and the editor model

pub mod editor;
pub mod mdast;
pub mod parsing;
pub mod transform;

// Re-export key types for easier usage
pub use editor::{EditorError, EditorNode, Element, ElementKind, TextLeaf, from_json, to_json};
pub use mdast::{Node, Root, Tag, WikiLink, to_markdown};
pub use parsing::{parse_markdown, tokenize};
pub use transform::{
    TransformOptions, editor_to_mdast, editor_to_string, mdast_to_editor, string_to_editor,
};
