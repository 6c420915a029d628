//! # Parsing
//!
//! Markdown text to [`Root`]. pulldown-cmark supplies the block and
//! standard inline structure; the dialect's wikilinks, embeds and tags are
//! recognized by the tokenizers in [`inline`] and turned into nodes by
//! [`bridge`].
//!
//! ## Modules
//!
//! - **`span`**: byte ranges into the source buffer
//! - **`inline`**: cursor, tokens, tokenizers and the text-run scanner
//! - **`bridge`**: token stream to AST nodes
//! - **`events`**: pulldown-cmark event stream to AST
//! - **`invariants`**: structural checks on token streams, for tests

pub mod bridge;
pub mod events;
pub mod inline;
pub mod invariants;
pub mod span;

pub use events::{options, parse_markdown};
pub use inline::{Token, TokenKind, tokenize};
pub use span::Span;
