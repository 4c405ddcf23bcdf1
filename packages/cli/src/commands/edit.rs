use super::show::print_drafts;
use super::store::SessionFile;
use anyhow::{anyhow, bail, Result};
use clap::Args;
use colored::Colorize;
use polydraft_engine::{ConditionPart, EditOutcome, EditSession};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Session file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Draft number to edit, as listed by `show`
    #[arg(short, long, default_value_t = 1)]
    pub draft: usize,

    /// Full new text of the draft
    #[arg(long, required_unless_present = "replace")]
    pub text: Option<String>,

    /// Replace the first occurrence of FROM with TO
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"], conflicts_with = "text")]
    pub replace: Option<Vec<String>>,

    /// Only apply to drafts containing this part of the edited draft (repeatable)
    #[arg(long = "when")]
    pub conditions: Vec<String>,
}

pub fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let file = SessionFile::resolve(cwd, args.file.as_deref(), false, false)?;
    let mut session = file.open()?;

    if args.draft == 0 {
        bail!("Draft numbers start at 1");
    }
    session.select_index(args.draft - 1)?;

    let current = session.selected_text().unwrap_or_default();
    let new_text = match (&args.text, &args.replace) {
        (Some(text), _) => text.clone(),
        (None, Some(pair)) => replace_first(&current, &pair[0], &pair[1])?,
        (None, None) => bail!("Either --text or --replace is required"),
    };

    let conditions = args
        .conditions
        .iter()
        .map(|needle| condition_for(&session, needle))
        .collect::<Result<Vec<_>>>()?;

    let outcome = session.apply_edit(&new_text, &conditions)?;
    file.write(&session)?;

    print_outcome(&outcome);
    print_drafts(&session);
    Ok(())
}

/// `text` with the first `from` replaced by `to`
pub fn replace_first(text: &str, from: &str, to: &str) -> Result<String> {
    if from.is_empty() || !text.contains(from) {
        bail!("{:?} does not occur in the selected draft", from);
    }
    Ok(text.replacen(from, to, 1))
}

/// Condition covering the first occurrence of `needle` in the selected draft
pub fn condition_for(session: &EditSession, needle: &str) -> Result<ConditionPart> {
    let text = session.selected_text().unwrap_or_default();
    let byte_start = text
        .find(needle)
        .filter(|_| !needle.is_empty())
        .ok_or_else(|| anyhow!("Condition {:?} does not occur in the selected draft", needle))?;

    let start = text[..byte_start].chars().count();
    let end = start + needle.chars().count();
    Ok(session.condition_part(start, end)?)
}

pub fn print_outcome(outcome: &EditOutcome) {
    println!(
        "{} Suggestion {} created {} draft(s)",
        "✓".green(),
        outcome.suggestion_id.to_string().bold(),
        outcome.created
    );

    let skipped = [
        ("outside condition", outcome.gated),
        ("no match", outcome.unmatched),
        ("empty result", outcome.degenerate),
        ("duplicate", outcome.duplicates),
    ];
    let details: Vec<String> = skipped
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| format!("{} {}", count, label))
        .collect();
    if !details.is_empty() {
        println!("  {}", format!("skipped: {}", details.join(", ")).dimmed());
    }
}
