//! # Inline Kinds
//!
//! Inline constructs that own their syntax delimiters and their tokenizer.
//!
//! ## Types
//!
//! - **`WikiLink`**: `EMBED = b'!'`, `OPEN = b"[["`, `HASH = b'#'`,
//!   `ALIAS = b'|'`, `CLOSE = b"]]"`
//! - **`Tag`**: `MARKER = b'#'` followed by `[A-Za-z0-9_/-]+` with at least
//!   one non-digit
//!
//! ## Design Principle
//!
//! All delimiter constants live here, not scattered in scanner code. Each
//! tokenizer either returns the complete token sequence with the cursor
//! advanced past the construct, or `None` with the cursor untouched.

pub mod tag;
pub mod wikilink;

pub use tag::Tag;
pub use wikilink::WikiLink;
