use super::store::SessionFile;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SuggestionsArgs {
    /// Session file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print suggestions as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn suggestions(args: SuggestionsArgs, cwd: &str) -> Result<()> {
    let file = SessionFile::resolve(cwd, args.file.as_deref(), false, false)?;
    let session = file.open()?;
    let views = session.suggestions();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No suggestions recorded");
        return Ok(());
    }

    for view in views {
        let score = if view.score < 1 {
            view.score.to_string().red()
        } else {
            view.score.to_string().green()
        };
        println!(
            "{} score {}  -{} +{} chars, {} condition chars",
            format!("#{}", view.id).bold(),
            score,
            view.removed,
            view.added,
            view.conditions
        );
        println!("    {}", view.selected_text.dimmed());
        println!("  → {}", view.resulting_text);
    }
    Ok(())
}
