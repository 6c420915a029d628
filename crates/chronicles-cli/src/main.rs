//! Command-line tools for inspecting and converting chronicles notes.
use anyhow::{Context, Result};
use chronicles_config::Config;
use chronicles_engine::{
    TransformOptions, editor_to_string, from_json,
    mdast::{Node, html::wikilink_to_html, tag_to_markdown, wikilink_to_markdown},
    parse_markdown, string_to_editor, to_json, tokenize,
};
use clap::{Parser, Subcommand};
use std::{
    io::Read,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "chronicles-cli")]
#[command(about = "Inspect and convert chronicles markdown notes")]
struct Args {
    /// Config file to use instead of ~/.config/chronicles/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the editor tree of a markdown note as JSON
    Tree { file: Option<PathBuf> },
    /// Print the markdown AST of a note as JSON
    Ast { file: Option<PathBuf> },
    /// Render an editor tree (JSON) back to markdown
    Render { file: Option<PathBuf> },
    /// Convert markdown to the editor tree and back
    Roundtrip {
        file: Option<PathBuf>,
        /// Fail when the output differs from the input
        #[arg(long)]
        check: bool,
    },
    /// List the dialect tokens found in a text
    Tokens { file: Option<PathBuf> },
    /// List the wikilinks, embeds and tags of a note
    Links {
        file: Option<PathBuf>,
        /// Print links as HTML instead of markdown
        #[arg(long)]
        html: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let opts = load_options(args.config.as_deref())?;

    let output = match args.command {
        Command::Tree { file } => tree(&read_input(file.as_deref())?, &opts)?,
        Command::Ast { file } => ast(&read_input(file.as_deref())?)?,
        Command::Render { file } => render(&read_input(file.as_deref())?, &opts)?,
        Command::Roundtrip { file, check } => {
            let input = read_input(file.as_deref())?;
            let output = roundtrip(&input, &opts);
            if check && output != input {
                anyhow::bail!("markdown changed after a round trip through the editor");
            }
            output
        }
        Command::Tokens { file } => tokens(&read_input(file.as_deref())?),
        Command::Links { file, html } => links(&read_input(file.as_deref())?, html),
    };
    print!("{output}");
    Ok(())
}

fn load_options(config_path: Option<&Path>) -> Result<TransformOptions> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    match config {
        Some(config) => {
            log::debug!("using markdown settings from config");
            Ok(config.markdown.transform_options())
        }
        None => Ok(TransformOptions::default()),
    }
}

/// Reads the named file, or stdin when none is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn tree(markdown: &str, opts: &TransformOptions) -> Result<String> {
    let json = to_json(&string_to_editor(markdown, opts))?;
    Ok(json + "\n")
}

fn ast(markdown: &str) -> Result<String> {
    let json = serde_json::to_string_pretty(&parse_markdown(markdown))?;
    Ok(json + "\n")
}

fn render(json: &str, opts: &TransformOptions) -> Result<String> {
    let nodes = from_json(json)?;
    Ok(editor_to_string(&nodes, opts))
}

fn roundtrip(markdown: &str, opts: &TransformOptions) -> String {
    editor_to_string(&string_to_editor(markdown, opts), opts)
}

fn tokens(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .map(|token| {
            format!(
                "{:?} {}..{} {:?}\n",
                token.kind,
                token.span.start,
                token.span.end,
                token.text(text)
            )
        })
        .collect()
}

fn links(markdown: &str, html: bool) -> String {
    fn walk(nodes: &[Node], html: bool, out: &mut Vec<String>) {
        for node in nodes {
            match node {
                Node::WikiLink(link) if html => out.push(wikilink_to_html(link)),
                Node::WikiLink(link) => out.push(wikilink_to_markdown(link)),
                Node::Tag(tag) => out.push(tag_to_markdown(tag)),
                other => walk(other.children(), html, out),
            }
        }
    }

    let mut lines = Vec::new();
    walk(&parse_markdown(markdown).children, html, &mut lines);
    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_tokens_listing() {
        assert_eq!(
            tokens("hi #work"),
            "TagMarker 3..4 \"#\"\nTagContent 4..8 \"work\"\n"
        );
    }

    #[test]
    fn test_links_listing() {
        let note = "See [[notes/plan.md|the plan]], ![[a.png]] and #todo\n\n`[[not this]]`\n";
        assert_eq!(
            links(note, false),
            "[[notes/plan.md|the plan]]\n![[a.png]]\n#todo\n"
        );
    }

    #[test]
    fn test_links_listing_without_links() {
        assert_eq!(links("plain text only\n", false), "");
    }

    #[test]
    fn test_links_as_html() {
        assert_eq!(
            links("[[notes/plan.md#goals]]", true),
            "<a href=\"notes/plan.md#goals\">plan</a>\n"
        );
    }

    #[test]
    fn test_tree_then_render() {
        let opts = TransformOptions::default();
        let json = tree("# Plan\n\n- [[a]] #b\n", &opts).unwrap();
        assert_eq!(render(&json, &opts).unwrap(), "# Plan\n\n- [[a]] #b\n");
    }

    #[test]
    fn test_render_rejects_bad_json() {
        let err = render("[{", &TransformOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid editor document JSON"));
    }

    #[test]
    fn test_ast_is_json() {
        let json = ast("#tag").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "root");
        assert_eq!(value["children"][0]["children"][0]["type"], "tag");
    }

    #[test]
    fn test_roundtrip_is_stable() {
        let opts = TransformOptions::default();
        let note = "Intro with **bold**\n\n![a](a.png)\n\n![b](b.png)\n";
        assert_eq!(roundtrip(note, &opts), note);
    }

    #[test]
    fn test_options_from_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "[markdown]\nasset_scheme = \"assets://\"\n",
        )
        .unwrap();

        let opts = load_options(Some(config_file.as_path())).unwrap();
        assert_eq!(opts.asset_scheme, "assets://");
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let opts = load_options(Some(temp_dir.path().join("none.toml").as_path())).unwrap();
        assert_eq!(opts, TransformOptions::default());
    }
}
