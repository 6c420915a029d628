use std::sync::OnceLock;

use regex::Regex;

/// The note a relative markdown link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLinkTarget {
    pub journal_name: String,
    pub note_id: String,
}

fn note_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\.\./(?:(.+)/)?([a-zA-Z0-9-]+)\.md$").expect("Invalid note link regex")
    })
}

/// Recognizes `../<journal>/<noteId>.md`. Both parts are required.
pub fn parse_note_link(url: &str) -> Option<NoteLinkTarget> {
    let caps = note_link_regex().captures(url)?;
    Some(NoteLinkTarget {
        journal_name: caps.get(1)?.as_str().to_string(),
        note_id: caps.get(2)?.as_str().to_string(),
    })
}

/// Notes are stored as `<journal>/<noteId>.md`, so links are relative to a
/// sibling journal directory.
pub fn note_link_url(journal_name: &str, note_id: &str) -> String {
    format!("../{journal_name}/{note_id}.md")
}
