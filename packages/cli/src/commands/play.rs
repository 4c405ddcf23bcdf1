use super::edit::{condition_for, print_outcome, replace_first};
use super::show::print_drafts;
use super::store::SessionFile;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use polydraft_engine::{EditSession, Vote};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Script file, one step per line
    pub script: PathBuf,

    /// Session file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Run the script without saving the result
    #[arg(long)]
    pub dry_run: bool,
}

/// One line of an edit script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `seed <text>`
    Seed(String),
    /// `select <n>`, 1-based
    Select(usize),
    /// `edit <text>`
    Edit(String),
    /// `replace <from> => <to>`
    Replace { from: String, to: String },
    /// `when <text>`, conditions the next edit
    When(String),
    /// `vote <id> up|down`
    Vote(u32, Vote),
    Undo,
    Redo,
    ToggleHide,
    ToggleSort,
    Show,
}

impl Step {
    /// Parse a script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.trim_start().split_once(' ') {
            Some((word, rest)) => (word, unescape(rest)),
            None => (line.trim_start(), String::new()),
        };

        let step = match word {
            "seed" => Step::Seed(rest),
            "edit" => Step::Edit(rest),
            "when" => Step::When(rest),
            "select" => Step::Select(
                rest.trim()
                    .parse()
                    .with_context(|| format!("Bad draft number {:?}", rest))?,
            ),
            "replace" => {
                let (from, to) = rest
                    .split_once(" => ")
                    .ok_or_else(|| anyhow!("Expected `replace <from> => <to>`"))?;
                Step::Replace {
                    from: from.to_string(),
                    to: to.to_string(),
                }
            }
            "vote" => {
                let mut parts = rest.split_whitespace();
                let id = parts
                    .next()
                    .and_then(|id| id.parse().ok())
                    .ok_or_else(|| anyhow!("Expected `vote <id> up|down`"))?;
                let vote = match parts.next() {
                    Some("up") => Vote::Up,
                    Some("down") => Vote::Down,
                    _ => bail!("Expected `vote <id> up|down`"),
                };
                Step::Vote(id, vote)
            }
            "undo" => Step::Undo,
            "redo" => Step::Redo,
            "toggle-hide" => Step::ToggleHide,
            "toggle-sort" => Step::ToggleSort,
            "show" => Step::Show,
            other => bail!("Unknown step {:?}", other),
        };
        Ok(Some(step))
    }
}

/// Undo `\n`, `\t` and `\\` escapes in script text
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub fn parse_script(source: &str) -> Result<Vec<(usize, Step)>> {
    let mut steps = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        if let Some(step) = Step::parse(line).with_context(|| format!("line {}", number))? {
            steps.push((number, step));
        }
    }
    Ok(steps)
}

/// Run parsed steps against `session`, stopping at the first failure
pub fn run_steps(session: &mut EditSession, steps: &[(usize, Step)]) -> Result<()> {
    let mut pending: Vec<String> = Vec::new();

    for (number, step) in steps {
        run_step(session, step, &mut pending).with_context(|| format!("line {}", number))?;
    }
    Ok(())
}

fn run_step(session: &mut EditSession, step: &Step, pending: &mut Vec<String>) -> Result<()> {
    match step {
        Step::Seed(text) => session.set_initial_draft(text)?,
        Step::Select(n) => {
            if *n == 0 {
                bail!("Draft numbers start at 1");
            }
            session.select_index(n - 1)?;
        }
        Step::When(text) => pending.push(text.clone()),
        Step::Edit(text) => apply(session, text.clone(), pending)?,
        Step::Replace { from, to } => {
            let current = session.selected_text().unwrap_or_default();
            apply(session, replace_first(&current, from, to)?, pending)?;
        }
        Step::Vote(id, vote) => {
            let score = session.vote(*id, *vote)?;
            println!("{} Suggestion {} now scores {}", "✓".green(), id, score);
        }
        Step::Undo => {
            if !session.undo() {
                println!("{} Nothing to undo", "⚠".yellow());
            }
        }
        Step::Redo => {
            if !session.redo() {
                println!("{} Nothing to redo", "⚠".yellow());
            }
        }
        Step::ToggleHide => {
            session.toggle_hide_bad_edits();
        }
        Step::ToggleSort => {
            session.toggle_sort_by_score();
        }
        Step::Show => print_drafts(session),
    }
    Ok(())
}

fn apply(session: &mut EditSession, new_text: String, pending: &mut Vec<String>) -> Result<()> {
    let conditions = pending
        .drain(..)
        .map(|needle| condition_for(session, &needle))
        .collect::<Result<Vec<_>>>()?;

    let outcome = session.apply_edit(&new_text, &conditions)?;
    print_outcome(&outcome);
    Ok(())
}

pub fn play(args: PlayArgs, cwd: &str) -> Result<()> {
    let file = SessionFile::resolve(cwd, args.file.as_deref(), false, false)?;
    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let steps = parse_script(&source)?;

    let mut session = if file.exists() {
        file.open()?
    } else {
        EditSession::with_options(file.options)
    };

    println!(
        "▶ {} {} step(s) from {}",
        "Playing".green().bold(),
        steps.len(),
        args.script.display()
    );
    run_steps(&mut session, &steps)?;

    if args.dry_run {
        println!("{} Dry run, session not saved", "⚠".yellow());
    } else {
        file.write(&session)?;
        println!("{} Saved {}", "✓".green(), file.path.display());
    }
    Ok(())
}
