use anyhow::{bail, Result};
use clap::Args;
use serde_json::{json, Value};
use troublecode_codec::BundleCodec;
use troublecode_tree::{build_path_index, NodePath, NodeRef, PathIndex};

use super::decode_from;
use crate::input::TokenSource;

#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub source: TokenSource,

    /// Only show nodes up to this depth (the root is depth 0)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Print the node table as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Node path, e.g. `logs[0].message` (empty for the root)
    pub path: String,

    #[command(flatten)]
    pub source: TokenSource,
}

pub async fn run_tree(args: TreeArgs, codec: &BundleCodec) -> Result<()> {
    let bundle = decode_from(&args.source, codec).await?;
    let index = build_path_index(&bundle);
    log::info!("{}", index.summary());

    let visible = index
        .iter()
        .filter(|node| args.max_depth.map_or(true, |max| node.depth() <= max));

    if args.json {
        let nodes: Vec<_> = visible.map(|node| node.node()).collect();
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    let open: Vec<_> = index
        .sections()
        .into_iter()
        .filter(|section| section.open_by_default)
        .map(|section| section.node)
        .collect();
    for node in visible {
        println!("{}", tree_line(&node, open.contains(&node.id())));
    }
    Ok(())
}

fn tree_line(node: &NodeRef<'_>, open: bool) -> String {
    let indent = "  ".repeat(node.depth());
    let marker = if open { "* " } else { "" };
    let mut line = format!("{indent}{marker}{}", node.label());
    if let Some(display) = node.display() {
        line.push_str(": ");
        line.push_str(display);
    }
    if !node.path().is_empty() {
        line.push_str("  @");
        line.push_str(node.path());
    }
    line
}

pub async fn run_lookup(args: LookupArgs, codec: &BundleCodec) -> Result<()> {
    let bundle = decode_from(&args.source, codec).await?;
    let index = build_path_index(&bundle);
    let report = lookup_report(&index, &bundle, &args.path)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn lookup_report(index: &PathIndex, bundle: &Value, path: &str) -> Result<Value> {
    let Some(activation) = index.activate(path) else {
        bail!("No node at path '{}'", path.trim());
    };
    let Some(node) = index.get(activation.target) else {
        bail!("No node at path '{}'", path.trim());
    };
    let value = NodePath::parse(node.path())
        .ok()
        .and_then(|parsed| parsed.resolve(bundle).cloned())
        .unwrap_or(Value::Null);
    let reveal: Vec<&str> = activation
        .reveal
        .iter()
        .filter_map(|id| index.get(*id))
        .map(|ancestor| ancestor.path())
        .collect();

    Ok(json!({
        "path": node.path(),
        "label": node.label(),
        "kind": node.kind(),
        "display": node.display(),
        "children": node.children().count(),
        "reveal": reveal,
        "value": value,
    }))
}
