use super::store::SessionFile;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use polydraft_engine::EditSession;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Initial text of the root draft
    #[arg(required_unless_present = "from")]
    pub text: Option<String>,

    /// Read the initial text from a file instead
    #[arg(long, conflicts_with = "text")]
    pub from: Option<PathBuf>,

    /// Session file to create
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Overwrite an existing session
    #[arg(long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let file = SessionFile::resolve(cwd, args.file.as_deref(), false, false)?;

    if file.exists() && !args.force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            "⚠".yellow(),
            file.path.display()
        );
        return Ok(());
    }

    let text = match (&args.text, &args.from) {
        (_, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (Some(text), None) => text.clone(),
        (None, None) => anyhow::bail!("No initial text given"),
    };

    let session = EditSession::seeded(&text, file.options)?;
    file.write(&session)?;

    println!("{} Created {}", "✓".green(), file.path.display());
    println!("  {}", session.selection_summary().dimmed());
    Ok(())
}
