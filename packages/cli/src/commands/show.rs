use super::store::SessionFile;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use polydraft_engine::EditSession;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Session file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Order drafts by score
    #[arg(long)]
    pub sort: bool,

    /// Hide drafts that contain a bad edit
    #[arg(long)]
    pub hide_bad: bool,

    /// Print drafts as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let file = SessionFile::resolve(cwd, args.file.as_deref(), args.sort, args.hide_bad)?;
    let session = file.open()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.visible_drafts())?);
    } else {
        print_drafts(&session);
    }
    Ok(())
}

/// Numbered draft listing; numbers are the 1-based positions `edit --draft` takes
pub fn print_drafts(session: &EditSession) {
    let views = session.visible_drafts();
    let hidden = session.drafts().len() - views.len();

    for view in &views {
        let marker = if view.selected { "▶".cyan() } else { " ".normal() };
        let score = match view.score {
            s if s < 1 => s.to_string().red(),
            s if s > 1 => s.to_string().green(),
            s => s.to_string().normal(),
        };
        println!(
            "{} {:>3}  {} {}  {}",
            marker,
            format!("#{}", view.index + 1).bold(),
            score,
            view.vector.dimmed(),
            view.text.replace('\n', " ⏎ ")
        );
    }

    if hidden > 0 {
        println!("  {}", format!("({} hidden)", hidden).dimmed());
    }
    println!("  {}", session.selection_summary().dimmed());
}
