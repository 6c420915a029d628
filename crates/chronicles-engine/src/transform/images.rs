//! Image and video handling: asset url scheme, video detection and the
//! gallery normalization of the editor tree.

use crate::editor::{EditorNode, Element, ElementKind};

/// Points a local asset url at the application's asset scheme. Remote
/// (`http…`) and inline (`data:`) urls are left alone.
pub fn prefix_url(url: &str, scheme: &str) -> String {
    if url.starts_with("http") || url.starts_with("data:") || url.starts_with(scheme) {
        url.to_string()
    } else {
        format!("{scheme}{url}")
    }
}

pub fn unprefix_url<'a>(url: &'a str, scheme: &str) -> &'a str {
    url.strip_prefix(scheme).unwrap_or(url)
}

/// Whether the url's extension (after its last `.`) names a video format.
pub fn is_video(url: &str, video_extensions: &[String]) -> bool {
    let extension = url.rsplit('.').next().unwrap_or_default().to_lowercase();
    video_extensions.iter().any(|v| v.eq_ignore_ascii_case(&extension))
}

/// Normalizes every block sibling list of the tree: a paragraph holding
/// nothing but one image or video is replaced by that media element, then
/// runs of two or more adjacent media elements are collected into an image
/// group.
pub fn normalize_media(nodes: Vec<EditorNode>) -> Vec<EditorNode> {
    let unwrapped = nodes.into_iter().map(|node| match node {
        EditorNode::Element(mut element) => {
            if holds_blocks(&element.kind) {
                element.children = normalize_media(element.children);
            }
            unwrap_singleton(element)
        }
        text => text,
    });
    group_runs(unwrapped)
}

fn holds_blocks(kind: &ElementKind) -> bool {
    matches!(
        kind,
        ElementKind::Blockquote
            | ElementKind::ListItem { .. }
            | ElementKind::FootnoteDefinition { .. }
    )
}

fn is_media(node: &EditorNode) -> bool {
    node.as_element().is_some_and(|e| e.kind.is_media())
}

fn unwrap_singleton(mut element: Element) -> EditorNode {
    if element.kind == ElementKind::Paragraph
        && element.children.len() == 1
        && is_media(&element.children[0])
    {
        if let Some(media) = element.children.pop() {
            return media;
        }
    }
    EditorNode::Element(element)
}

fn group_runs(nodes: impl Iterator<Item = EditorNode>) -> Vec<EditorNode> {
    let mut out = Vec::new();
    let mut run = Vec::new();

    fn flush(out: &mut Vec<EditorNode>, run: &mut Vec<EditorNode>) {
        if run.len() >= 2 {
            out.push(EditorNode::element(
                ElementKind::ImageGroup {
                    title: String::new(),
                },
                std::mem::take(run),
            ));
        } else {
            out.append(run);
        }
    }

    for node in nodes {
        if is_media(&node) {
            run.push(node);
        } else {
            flush(&mut out, &mut run);
            out.push(node);
        }
    }
    flush(&mut out, &mut run);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Media;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn img(url: &str) -> EditorNode {
        EditorNode::Element(Element::void(ElementKind::Image(Media {
            url: url.into(),
            ..Media::default()
        })))
    }

    fn p(children: Vec<EditorNode>) -> EditorNode {
        EditorNode::element(ElementKind::Paragraph, children)
    }

    fn group(children: Vec<EditorNode>) -> EditorNode {
        EditorNode::element(
            ElementKind::ImageGroup {
                title: String::new(),
            },
            children,
        )
    }

    #[rstest]
    #[case("a.png", "chronicles://a.png")]
    #[case("chronicles://a.png", "chronicles://a.png")]
    #[case("https://x.org/a.png", "https://x.org/a.png")]
    #[case("http://x.org/a.png", "http://x.org/a.png")]
    #[case("data:image/png;base64,AAAA", "data:image/png;base64,AAAA")]
    fn asset_prefix(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(prefix_url(url, "chronicles://"), expected);
    }

    #[test]
    fn unprefix_strips_scheme_only() {
        assert_eq!(unprefix_url("chronicles://a.png", "chronicles://"), "a.png");
        assert_eq!(unprefix_url("https://x/a.png", "chronicles://"), "https://x/a.png");
    }

    #[rstest]
    #[case("clip.mp4", true)]
    #[case("clip.MOV", true)]
    #[case("dir.v/clip.webm", true)]
    #[case("photo.png", false)]
    #[case("mp4", true)]
    #[case("noext", false)]
    fn video_detection(#[case] url: &str, #[case] video: bool) {
        let extensions: Vec<String> = ["mp4", "mov", "webm"].iter().map(|s| s.to_string()).collect();
        assert_eq!(is_video(url, &extensions), video);
    }

    #[test]
    fn groups_three_adjacent_images() {
        let nodes = vec![p(vec![img("a")]), p(vec![img("b")]), p(vec![img("c")])];
        assert_eq!(
            normalize_media(nodes),
            vec![group(vec![img("a"), img("b"), img("c")])]
        );
    }

    #[test]
    fn singleton_is_unwrapped_not_grouped() {
        let nodes = vec![
            p(vec![img("a")]),
            p(vec![EditorNode::text("between")]),
            p(vec![img("b")]),
        ];
        assert_eq!(
            normalize_media(nodes),
            vec![
                img("a"),
                p(vec![EditorNode::text("between")]),
                img("b"),
            ]
        );
    }

    #[test]
    fn inline_images_stay_in_paragraphs() {
        let nodes = vec![p(vec![EditorNode::text("see "), img("a")])];
        assert_eq!(normalize_media(nodes.clone()), nodes);
    }

    #[test]
    fn normalizes_inside_blockquotes() {
        let quote = |children| EditorNode::element(ElementKind::Blockquote, children);
        let nodes = vec![quote(vec![p(vec![img("a")]), p(vec![img("b")])])];
        assert_eq!(
            normalize_media(nodes),
            vec![quote(vec![group(vec![img("a"), img("b")])])]
        );
    }
}
