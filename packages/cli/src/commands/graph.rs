use super::store::SessionFile;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Session file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Leave out drafts that contain a bad edit
    #[arg(long)]
    pub hide_bad: bool,

    /// Print the graph as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn graph(args: GraphArgs, cwd: &str) -> Result<()> {
    let file = SessionFile::resolve(cwd, args.file.as_deref(), false, args.hide_bad)?;
    let session = file.open()?;
    let graph = session.graph();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!("{} ({} nodes)", "Drafts".bold(), graph.nodes.len());
    for node in &graph.nodes {
        println!("  • {}", node);
    }

    println!("{} ({} edges)", "Edges".bold(), graph.edges.len());
    for (from, to) in &graph.edges {
        println!("  {} {} {}", from.dimmed(), "→".cyan(), to);
    }
    Ok(())
}
