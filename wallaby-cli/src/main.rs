//! Wallaby CLI
//!
//! Load an HTML document from a file, URL, or literal markup, optionally
//! run a selector over it, and print the matches or the tree outline.

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;

use wallaby_core::Document;
use wallaby_dom::{DomTree, NodeId, NodeKind};
use wallaby_html::ParseConfig;

#[derive(Parser)]
#[command(name = "wallaby", version, about = "Permissive HTML parsing and querying")]
struct Args {
    /// File path, URL, or literal HTML markup
    input: String,

    /// Selector to run against the document
    #[arg(short, long)]
    selector: Option<String>,

    /// Print only the 0-indexed nth match
    #[arg(long, requires = "selector")]
    nth: Option<usize>,

    /// Print matched nodes' text instead of their HTML
    #[arg(long)]
    text: bool,

    /// Evaluate selectors depth-first
    #[arg(long)]
    depth_first: bool,

    /// Print the parsed tree as an indented outline
    #[arg(long, conflicts_with = "selector")]
    outline: bool,

    /// JSON file with parse options
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{path}'"))?;
            serde_json::from_str::<ParseConfig>(&raw)
                .with_context(|| format!("failed to parse config '{path}'"))?
        }
        None => ParseConfig::default(),
    };
    config.depth_first_search |= args.depth_first;

    let mut doc = Document::with_config(config);
    doc.load(&args.input)
        .with_context(|| "failed to load document")?;

    if args.outline {
        let tree = doc.tree()?;
        print_outline(tree, tree.root(), 0);
        return Ok(());
    }

    let Some(selector) = &args.selector else {
        println!("{doc}");
        return Ok(());
    };

    let matches = match args.nth {
        Some(nth) => doc.find_nth(selector, nth)?.into_iter().collect(),
        None => doc.find(selector)?,
    };

    println!(
        "{} {} match(es) for {}",
        "==".green(),
        matches.len(),
        selector.bold()
    );
    let tree = doc.tree()?;
    for (i, id) in matches.iter().enumerate() {
        println!("{}", format!("-- [{i}]").green());
        if args.text {
            println!("{}", tree.text(*id, true));
        } else {
            println!("{}", tree.outer_html(*id)?);
        }
    }

    Ok(())
}

/// Print the tree as an indented outline, one node per line.
fn print_outline(tree: &DomTree, id: NodeId, depth: usize) {
    let indent = "  ".repeat(depth);
    match tree.get(id).map(wallaby_dom::Node::kind) {
        Some(NodeKind::Element(tag)) => {
            println!("{indent}{}", format!("<{}>", tag.name()).cyan());
            for &child in tree.children(id) {
                print_outline(tree, child, depth + 1);
            }
        }
        Some(NodeKind::Text(text)) => {
            println!("{indent}{:?}", text);
        }
        None => {}
    }
}
