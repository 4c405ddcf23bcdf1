use super::store::SessionFile;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use polydraft_engine::Vote;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for Vote {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Vote::Up,
            Direction::Down => Vote::Down,
        }
    }
}

#[derive(Args, Debug)]
pub struct VoteArgs {
    /// Suggestion number
    pub suggestion: u32,

    /// Vote direction
    #[arg(value_enum)]
    pub direction: Direction,

    /// Session file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

pub fn vote(args: VoteArgs, cwd: &str) -> Result<()> {
    let file = SessionFile::resolve(cwd, args.file.as_deref(), false, false)?;
    let mut session = file.open()?;

    let score = session.vote(args.suggestion, args.direction.into())?;
    file.write(&session)?;

    println!(
        "{} Suggestion {} now scores {}",
        "✓".green(),
        args.suggestion.to_string().bold(),
        score
    );
    if score < 1 {
        println!(
            "  {}",
            "Drafts containing it are now marked as bad edits".yellow()
        );
    }
    Ok(())
}
