//! Markdown output.
//!
//! [`wikilink_to_markdown`] and [`tag_to_markdown`] render the dialect's
//! nodes as fragments. [`to_markdown`] renders a whole document with `-`
//! bullets, `_` emphasis, `**` strong, `~~` strikethrough, fenced code, ATX
//! headings and `***` rules. Text is escaped so that parsing the output
//! yields the same tree.

use std::sync::OnceLock;

use regex::Regex;

use super::{AlignKind, Node, Root, Tag, WikiLink};
use crate::parsing::inline::kinds::Tag as TagSyntax;

/// `[[url#hash|alias]]`, with `!` in front of embeds. The hash only appears
/// when non-empty and the alias only when it differs from the display value
/// the url implies.
pub fn wikilink_to_markdown(link: &WikiLink) -> String {
    let mut out = String::with_capacity(link.url.len() + link.hash.len() + 8);
    if link.is_embed() {
        out.push('!');
    }
    out.push_str("[[");
    out.push_str(&link.url);
    if !link.hash.is_empty() {
        out.push('#');
        out.push_str(&link.hash);
    }
    if link.has_alias() {
        out.push('|');
        out.push_str(&link.value);
    }
    out.push_str("]]");
    out
}

pub fn tag_to_markdown(tag: &Tag) -> String {
    format!("#{}", tag.value)
}

/// Renders a document. Non-empty output ends with a newline.
pub fn to_markdown(root: &Root) -> String {
    let mut out = join_blocks(&root.children, "\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, Copy, Default)]
struct Ctx {
    in_table: bool,
}

fn join_blocks(nodes: &[Node], sep: &str) -> String {
    let mut parts = Vec::with_capacity(nodes.len());
    let mut prev_list = None;
    let mut alternate = false;
    for node in nodes {
        // adjacent lists of one kind would merge unless their markers differ
        if let Node::List { ordered, .. } = node {
            alternate = prev_list == Some(*ordered) && !alternate;
            prev_list = Some(*ordered);
        } else {
            prev_list = None;
            alternate = false;
        }
        let rendered = block(node, alternate);
        if !rendered.is_empty() {
            parts.push(rendered);
        }
    }
    parts.join(sep)
}

fn block(node: &Node, alternate: bool) -> String {
    match node {
        Node::Paragraph { children } => escape_line_starts(&inlines(children, Ctx::default())),
        Node::Heading { depth, children } => {
            let hashes = "#".repeat(usize::from((*depth).clamp(1, 6)));
            let text = inlines(children, Ctx::default());
            if text.is_empty() {
                hashes
            } else {
                format!("{hashes} {text}")
            }
        }
        Node::ThematicBreak => "***".to_string(),
        Node::Blockquote { children } => {
            let body = join_blocks(children, "\n\n");
            body.split('\n')
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Node::List {
            ordered,
            start,
            spread,
            children,
        } => list(*ordered, *start, *spread, children, alternate),
        Node::ListItem { .. } => list_item(node, "-", false),
        Node::Table { align, children } => table(align, children),
        Node::Html { value } => value.clone(),
        Node::Code { lang, meta, value } => code_block(lang.as_deref(), meta.as_deref(), value),
        Node::FootnoteDefinition {
            identifier,
            children,
        } => {
            let body = join_blocks(children, "\n\n");
            format!("[^{identifier}]: {}", indent_rest(&body, "    "))
        }
        Node::Image { .. } => inline(node, Ctx::default()),
        Node::TableRow { children } | Node::TableCell { children } => {
            escape_line_starts(&inlines(children, Ctx::default()))
        }
        other => escape_line_starts(&inline(other, Ctx::default())),
    }
}

fn list(ordered: bool, start: Option<u64>, spread: bool, items: &[Node], alternate: bool) -> String {
    let mut number = start.unwrap_or(1);
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let marker = if ordered {
            format!("{number}{}", if alternate { ')' } else { '.' })
        } else if alternate {
            "*".to_string()
        } else {
            "-".to_string()
        };
        number += 1;
        out.push(list_item(item, &marker, spread));
    }
    out.join(if spread { "\n\n" } else { "\n" })
}

fn list_item(item: &Node, marker: &str, list_spread: bool) -> String {
    let (checked, spread, children) = match item {
        Node::ListItem {
            checked,
            spread,
            children,
        } => (*checked, *spread, children.as_slice()),
        other => (None, false, std::slice::from_ref(other)),
    };
    let sep = if spread || list_spread { "\n\n" } else { "\n" };
    let mut body = join_blocks(children, sep);
    if let Some(checked) = checked {
        body = format!("[{}] {body}", if checked { 'x' } else { ' ' });
    }
    if body.is_empty() {
        return marker.to_string();
    }
    let indent = " ".repeat(marker.len() + 1);
    format!("{marker} {}", indent_rest(&body, &indent)).trim_end().to_string()
}

fn table(align: &[AlignKind], rows: &[Node]) -> String {
    let ctx = Ctx { in_table: true };
    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .children()
            .iter()
            .map(|cell| inlines(cell.children(), ctx).replace('\n', " "))
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
        if i == 0 {
            let columns = align.len().max(cells.len());
            let delimiters: Vec<&str> = (0..columns)
                .map(|c| match align.get(c).copied().unwrap_or_default() {
                    AlignKind::None => "---",
                    AlignKind::Left => ":--",
                    AlignKind::Center => ":-:",
                    AlignKind::Right => "--:",
                })
                .collect();
            lines.push(format!("| {} |", delimiters.join(" | ")));
        }
    }
    lines.join("\n")
}

fn code_block(lang: Option<&str>, meta: Option<&str>, value: &str) -> String {
    let fence = "`".repeat((longest_run(value, '`') + 1).max(3));
    let mut info = lang.unwrap_or_default().to_string();
    if let Some(meta) = meta {
        info.push(' ');
        info.push_str(meta);
    }
    if value.is_empty() {
        format!("{fence}{info}\n{fence}")
    } else {
        format!("{fence}{info}\n{value}\n{fence}")
    }
}

fn inlines(nodes: &[Node], ctx: Ctx) -> String {
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        match node {
            Node::Emphasis { children } => {
                // `_` cannot open or close emphasis inside a word
                let glued_before = out.chars().last().is_some_and(char::is_alphanumeric);
                let glued_after = nodes
                    .get(i + 1)
                    .and_then(|next| next.plain_text().chars().next())
                    .is_some_and(char::is_alphanumeric);
                let marker = if glued_before || glued_after { "*" } else { "_" };
                out.push_str(&wrap(marker, children, ctx));
            }
            Node::Text { value } => {
                let mut text = escape_text(value, ctx);
                // a bare `!` in front of `[` would turn the link into an image or embed
                let opens_link = match nodes.get(i + 1) {
                    Some(Node::WikiLink(link)) => !link.is_embed(),
                    Some(Node::Link { .. }) => true,
                    _ => false,
                };
                if opens_link && text.ends_with('!') {
                    text.insert(text.len() - 1, '\\');
                }
                out.push_str(&text);
            }
            other => out.push_str(&inline(other, ctx)),
        }
    }
    out
}

fn inline(node: &Node, ctx: Ctx) -> String {
    match node {
        Node::Text { value } => escape_text(value, ctx),
        Node::Emphasis { children } => wrap("_", children, ctx),
        Node::Strong { children } => wrap("**", children, ctx),
        Node::Delete { children } => wrap("~~", children, ctx),
        Node::InlineCode { value } => code_span(value),
        Node::Break => "\\\n".to_string(),
        Node::Link {
            url,
            title,
            children,
        } => format!(
            "[{}]({})",
            inlines(children, ctx),
            destination(url, title.as_deref())
        ),
        Node::Image { url, title, alt } => format!(
            "![{}]({})",
            escape_text(alt, ctx),
            destination(url, title.as_deref())
        ),
        Node::FootnoteReference { identifier } => format!("[^{identifier}]"),
        Node::WikiLink(link) => wikilink_to_markdown(link),
        Node::Tag(tag) => tag_to_markdown(tag),
        Node::Html { value } => value.clone(),
        other => escape_text(&other.plain_text(), ctx),
    }
}

fn wrap(marker: &str, children: &[Node], ctx: Ctx) -> String {
    let inner = inlines(children, ctx);
    if inner.is_empty() {
        inner
    } else {
        format!("{marker}{inner}{marker}")
    }
}

fn code_span(value: &str) -> String {
    let fence = "`".repeat(longest_run(value, '`') + 1);
    let pad = value.starts_with('`')
        || value.ends_with('`')
        || (value.starts_with(' ') && value.ends_with(' ') && !value.trim().is_empty());
    if pad {
        format!("{fence} {value} {fence}")
    } else {
        format!("{fence}{value}{fence}")
    }
}

fn destination(url: &str, title: Option<&str>) -> String {
    let mut out = if url.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{}>", url.replace('<', "\\<").replace('>', "\\>"))
    } else {
        url.to_string()
    };
    if let Some(title) = title {
        out.push_str(&format!(" \"{}\"", title.replace('"', "\\\"")));
    }
    out
}

fn longest_run(s: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in s.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn escape_text(value: &str, ctx: Ctx) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev: Option<char> = None;
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        let escape = match c {
            '\\' | '*' | '`' | '[' | '<' | '&' | '~' => true,
            '|' => ctx.in_table,
            '_' => {
                !(prev.is_some_and(char::is_alphanumeric) && next.is_some_and(char::is_alphanumeric))
            }
            '#' => {
                next.is_some_and(|n| n.is_ascii() && TagSyntax::is_tag_byte(n as u8))
                    && prev.is_none_or(char::is_whitespace)
            }
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Matches line openings that would start a block construct.
fn line_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^ {0,3}(?:(?P<digits>\d{1,9})[.)](?:[ \t]|$)|(?P<marker>#{1,6}(?:[ \t]|$)|>|[-+](?:[ \t]|$)|=+[ \t]*$|-+[ \t]*$))",
        )
        .expect("Invalid line start regex")
    })
}

fn escape_line_starts(s: &str) -> String {
    s.split('\n')
        .map(|line| {
            let Some(caps) = line_start().captures(line) else {
                return line.to_string();
            };
            let at = match (caps.name("digits"), caps.name("marker")) {
                (Some(digits), _) => digits.end(),
                (None, Some(marker)) => marker.start(),
                (None, None) => return line.to_string(),
            };
            format!("{}\\{}", &line[..at], &line[at..])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indents every line after the first; blank lines stay blank.
fn indent_rest(body: &str, indent: &str) -> String {
    let mut lines = body.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_markdown;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(WikiLink::link("notes/plan.md"), "[[notes/plan.md]]")]
    #[case(WikiLink::link("notes/plan.md").with_alias("plan"), "[[notes/plan.md]]")]
    #[case(WikiLink::link("notes/plan.md").with_alias("the plan"), "[[notes/plan.md|the plan]]")]
    #[case(WikiLink::link("a").with_hash("sec"), "[[a#sec]]")]
    #[case(WikiLink::embed("a.png"), "![[a.png]]")]
    #[case(WikiLink::embed("a.png").with_hash("x").with_alias("pic"), "![[a.png#x|pic]]")]
    #[case(WikiLink::link(""), "[[]]")]
    fn wikilink_fragments(#[case] link: WikiLink, #[case] expected: &str) {
        assert_eq!(wikilink_to_markdown(&link), expected);
    }

    #[test]
    fn tag_fragment() {
        assert_eq!(tag_to_markdown(&Tag::new("work/urgent")), "#work/urgent");
    }

    #[rstest]
    #[case("[[ path ]]")]
    #[case("[[path #hash]]")]
    #[case("![[dir/a.b.png#x | y z ]]")]
    #[case("[[a|b |c]]")]
    #[case("[[a#b #c]]")]
    #[case("[[|alias only]]")]
    fn wikilink_round_trip(#[case] src: &str) {
        let first = parse_markdown(src);
        let Node::WikiLink(link) = &first.children[0].children()[0] else {
            panic!("expected a wikilink in {first:?}");
        };
        let again = parse_markdown(&wikilink_to_markdown(link));
        let Node::WikiLink(reparsed) = &again.children[0].children()[0] else {
            panic!("expected a wikilink in {again:?}");
        };
        assert_eq!(reparsed.url, link.url);
        assert_eq!(reparsed.hash, link.hash);
        assert_eq!(reparsed.value, link.value);
        assert_eq!(reparsed.is_embed(), link.is_embed());
    }

    #[test]
    fn document_rendering() {
        let src = "# Title\n\nSee [[notes/plan.md|the plan]] and #work/urgent\n\n- one\n- two\n\n```js\nlet a;\n```\n";
        assert_snapshot!(to_markdown(&parse_markdown(src)), @r"
        # Title

        See [[notes/plan.md|the plan]] and #work/urgent

        - one
        - two

        ```js
        let a;
        ```
        ");
    }

    #[test]
    fn marks_use_house_style() {
        let root = Root {
            children: vec![Node::paragraph(vec![
                Node::Emphasis {
                    children: vec![Node::text("em")],
                },
                Node::text(" "),
                Node::Strong {
                    children: vec![Node::text("strong")],
                },
                Node::text(" "),
                Node::Delete {
                    children: vec![Node::text("gone")],
                },
                Node::text(" "),
                Node::InlineCode {
                    value: "a`b".into(),
                },
            ])],
        };
        assert_eq!(to_markdown(&root), "_em_ **strong** ~~gone~~ ``a`b``\n");
    }

    #[test]
    fn intraword_emphasis_switches_marker() {
        let root = Root {
            children: vec![Node::paragraph(vec![
                Node::text("a"),
                Node::Emphasis {
                    children: vec![Node::text("b")],
                },
                Node::text("c"),
            ])],
        };
        assert_eq!(to_markdown(&root), "a*b*c\n");
    }

    #[rstest]
    #[case("a [[b]] c", r"a \[\[b]] c")]
    #[case("#tag", r"\#tag")]
    #[case("x #123", r"x \#123")]
    #[case("c#d", "c#d")]
    #[case("snake_case", "snake_case")]
    #[case("_under", r"\_under")]
    #[case("1 < 2 & 3", r"1 \< 2 \& 3")]
    #[case("# not a heading", r"\# not a heading")]
    #[case("- not a list", r"\- not a list")]
    #[case("1. not a list", r"1\. not a list")]
    #[case("> not a quote", r"\> not a quote")]
    fn text_is_escaped(#[case] text: &str, #[case] expected: &str) {
        let root = Root {
            children: vec![Node::paragraph(vec![Node::text(text)])],
        };
        assert_eq!(to_markdown(&root), format!("{expected}\n"));
        assert_eq!(parse_markdown(&to_markdown(&root)), root);
    }

    #[test]
    fn bang_before_link_is_escaped() {
        let root = Root {
            children: vec![Node::paragraph(vec![
                Node::text("wow!"),
                Node::WikiLink(WikiLink::link("x")),
            ])],
        };
        assert_eq!(to_markdown(&root), "wow\\![[x]]\n");
        assert_eq!(parse_markdown("wow\\![[x]]"), root);
    }

    fn link(url: &str, text: &str) -> Node {
        Node::Link {
            url: url.into(),
            title: None,
            children: vec![Node::text(text)],
        }
    }

    #[rstest]
    #[case(vec![Node::text("wow!"), Node::WikiLink(WikiLink::link("x"))])]
    #[case(vec![Node::text("wow!"), link("b", "a")])]
    #[case(vec![Node::text("wow!"), Node::WikiLink(WikiLink::embed("a.png"))])]
    #[case(vec![Node::text("see "), Node::WikiLink(WikiLink::embed("a.png")), Node::text(" now")])]
    #[case(vec![Node::WikiLink(WikiLink::link("a")), Node::text("! and "), link("b", "c")])]
    #[case(vec![Node::text("a "), Node::image("a.png", "x"), Node::text(" b")])]
    #[case(vec![Node::Tag(Tag::new("t")), Node::text(". done")])]
    #[case(vec![Node::text("x "), Node::Tag(Tag::new("a")), Node::text(" y")])]
    #[case(vec![Node::Tag(Tag::new("a")), Node::Tag(Tag::new("b"))])]
    #[case(vec![
        Node::Strong { children: vec![Node::text("bold")] },
        Node::text(" and "),
        Node::Tag(Tag::new("t")),
    ])]
    fn mixed_siblings_reparse(#[case] children: Vec<Node>) {
        let root = Root {
            children: vec![Node::paragraph(children)],
        };
        assert_eq!(parse_markdown(&to_markdown(&root)), root);
    }

    #[test]
    fn adjacent_lists_alternate_bullets() {
        let item = |s: &str| Node::ListItem {
            checked: None,
            spread: false,
            children: vec![Node::paragraph(vec![Node::text(s)])],
        };
        let list = |s: &str| Node::List {
            ordered: false,
            start: None,
            spread: false,
            children: vec![item(s)],
        };
        let root = Root {
            children: vec![list("a"), list("b")],
        };
        let out = to_markdown(&root);
        assert_eq!(out, "- a\n\n* b\n");
        assert_eq!(parse_markdown(&out), root);
    }

    #[test]
    fn nested_blocks_are_indented() {
        let src = "> quote\n>\n> 1. one\n>    - nested\n";
        let root = parse_markdown(src);
        assert_eq!(to_markdown(&root), src);
    }

    #[test]
    fn block_images_render_standalone() {
        let root = Root {
            children: vec![
                Node::image("a.png", "first"),
                Node::image("my pic.png", "second"),
            ],
        };
        assert_eq!(
            to_markdown(&root),
            "![first](a.png)\n\n![second](<my pic.png>)\n"
        );
    }

    #[test]
    fn table_round_trips() {
        let src = "| a | b |\n| :-- | --: |\n| #x | 2 |\n";
        let root = parse_markdown(src);
        assert_eq!(to_markdown(&root), src);
    }

    #[test]
    fn empty_document_is_empty() {
        assert_eq!(to_markdown(&Root::default()), "");
    }
}
