use html_escape::{encode_double_quoted_attribute, encode_text};

use super::WikiLink;

/// `<a href="url#hash">value</a>`; embeds wrap the anchor in an iframe
/// pointing at the same target.
pub fn wikilink_to_html(link: &WikiLink) -> String {
    let mut target = link.url.clone();
    if !link.hash.is_empty() {
        target.push('#');
        target.push_str(&link.hash);
    }
    let href = encode_double_quoted_attribute(&target);
    let anchor = format!("<a href=\"{href}\">{}</a>", encode_text(&link.value));
    if link.is_embed() {
        format!("<iframe src=\"{href}\">{anchor}</iframe>")
    } else {
        anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn link_anchor() {
        let link = WikiLink::link("notes/plan.md").with_hash("goals");
        assert_eq!(
            wikilink_to_html(&link),
            r#"<a href="notes/plan.md#goals">plan</a>"#
        );
    }

    #[test]
    fn embed_iframe() {
        let link = WikiLink::embed("a.png");
        assert_eq!(
            wikilink_to_html(&link),
            r#"<iframe src="a.png"><a href="a.png">a</a></iframe>"#
        );
    }

    #[test]
    fn escapes_markup() {
        let link = WikiLink::link("x\"y").with_alias("<b>&</b>");
        assert_eq!(
            wikilink_to_html(&link),
            r#"<a href="x&quot;y">&lt;b&gt;&amp;&lt;/b&gt;</a>"#
        );
    }
}
