//! # Persisted Format
//!
//! Line-oriented text encoding of a whole session state:
//!
//! ```text
//! --- TEXTS ---                  score + indented text per draft (diagnostic only)
//! --- CHARACTER DETAILS ---      one '<char>'(<id>) line per draft
//! --- DRAFT VECTORS ---          "--- DRAFT KEY --- <key>" + "Vector: [..]"
//! --- EDIT SUGGESTIONS ---       one block per suggestion
//! ```
//!
//! Identities are written verbatim and restored verbatim, so a decoded state
//! is equal to the encoded one. Malformed vector and suggestion entries are
//! skipped one by one; anything wrong with the drafts themselves fails the
//! whole decode.

use crate::draft::{join_ids, parse_ids, Draft, DraftSet};
use crate::errors::ParseError;
use crate::history::Snapshot;
use crate::identity::{CharId, CharTable};
use crate::ledger::{ContributionVector, Ledger, Suggestion};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;
use tracing::warn;

pub const TEXTS_MARKER: &str = "--- TEXTS ---";
pub const CHARACTERS_MARKER: &str = "--- CHARACTER DETAILS ---";
pub const VECTORS_MARKER: &str = "--- DRAFT VECTORS ---";
pub const SUGGESTIONS_MARKER: &str = "--- EDIT SUGGESTIONS ---";

const DRAFT_KEY_PREFIX: &str = "--- DRAFT KEY ---";
const TEXT_INDENT: &str = "    ";

/// Encode `state`, looking characters up in `table`
pub fn serialize(state: &Snapshot, table: &CharTable) -> String {
    let mut output = String::new();

    output.push_str(TEXTS_MARKER);
    output.push('\n');
    for (n, (draft, vector)) in state.drafts.iter().enumerate() {
        let _ = writeln!(output, "--- DRAFT {} ---", n + 1);
        let _ = writeln!(output, "Score: {}", state.ledger.draft_score(vector));
        for line in table.text(draft.ids()).split('\n') {
            let _ = writeln!(output, "{TEXT_INDENT}{line}");
        }
    }

    output.push_str(CHARACTERS_MARKER);
    output.push('\n');
    for (n, draft) in state.drafts.drafts().enumerate() {
        let _ = writeln!(output, "--- DRAFT {} ---", n + 1);
        let _ = writeln!(output, "{}", encode_chars(draft.ids(), table));
    }

    output.push_str(VECTORS_MARKER);
    output.push('\n');
    for (draft, vector) in state.drafts.iter() {
        let _ = writeln!(output, "{DRAFT_KEY_PREFIX} {}", draft.key());
        let _ = writeln!(output, "Vector: {vector}");
    }

    output.push_str(SUGGESTIONS_MARKER);
    output.push('\n');
    for suggestion in state.ledger.iter() {
        serialize_suggestion(suggestion, table, &mut output);
    }

    output
}

fn serialize_suggestion(suggestion: &Suggestion, table: &CharTable, output: &mut String) {
    let _ = writeln!(output, "--- SUGGESTION {} ---", suggestion.id);
    let _ = writeln!(output, "Score: {}", suggestion.score);
    let _ = writeln!(
        output,
        "SelectedDraftAtTimeOfEdit: {}",
        encode_chars(suggestion.selected.ids(), table)
    );
    let _ = writeln!(
        output,
        "ResultingDraft: {}",
        encode_chars(suggestion.resulting.ids(), table)
    );
    let _ = writeln!(output, "RemovedCharIds: {}", join_ids(&suggestion.removed_ids));
    let _ = writeln!(output, "NewCharIds: {}", join_ids(&suggestion.new_ids));
    let _ = writeln!(output, "ConditionCharIds: {}", join_ids(&suggestion.condition_ids));
}

/// `'<char>'(<id>)` tokens with no separator
pub fn encode_chars(ids: &[CharId], table: &CharTable) -> String {
    let mut line = String::new();
    for id in ids {
        line.push('\'');
        push_escaped(table.char_of(*id), &mut line);
        let _ = write!(line, "'({id})");
    }
    line
}

fn push_escaped(ch: char, out: &mut String) {
    match ch {
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\'' => out.push_str("\\'"),
        '\\' => out.push_str("\\\\"),
        other => out.push(other),
    }
}

/// Inverse of [`encode_chars`]
pub fn decode_chars(line: &str) -> Result<Vec<(CharId, char)>, String> {
    let mut records = Vec::new();
    let mut chars = line.trim().chars();

    while let Some(open) = chars.next() {
        if open != '\'' {
            return Err(format!("expected ' but found {open:?}"));
        }
        let ch = match chars.next() {
            Some('\\') => match chars.next() {
                Some('n') => '\n',
                Some('t') => '\t',
                Some('r') => '\r',
                Some('\'') => '\'',
                Some('\\') => '\\',
                Some(other) => return Err(format!("unknown escape \\{other}")),
                None => return Err("unterminated escape".to_string()),
            },
            Some(ch) => ch,
            None => return Err("unterminated character".to_string()),
        };
        if chars.next() != Some('\'') || chars.next() != Some('(') {
            return Err(format!("malformed record for {ch:?}"));
        }
        let mut digits = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == ')' {
                closed = true;
                break;
            }
            digits.push(c);
        }
        if !closed {
            return Err(format!("unterminated identity for {ch:?}"));
        }
        let id = digits
            .parse::<CharId>()
            .map_err(|e| format!("bad identity {digits:?}: {e}"))?;
        records.push((id, ch));
    }

    Ok(records)
}

/// Decoded session state
#[derive(Debug)]
pub struct Decoded {
    pub state: Snapshot,
    pub table: CharTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Preamble,
    Texts,
    Characters,
    Vectors,
    Suggestions,
}

fn section_for(line: &str) -> Option<Section> {
    match line {
        TEXTS_MARKER => Some(Section::Texts),
        CHARACTERS_MARKER => Some(Section::Characters),
        VECTORS_MARKER => Some(Section::Vectors),
        SUGGESTIONS_MARKER => Some(Section::Suggestions),
        _ => None,
    }
}

fn block_number(line: &str, kind: &str) -> Option<u32> {
    line.strip_prefix("--- ")?
        .strip_prefix(kind)?
        .strip_suffix(" ---")?
        .trim()
        .parse()
        .ok()
}

/// Suggestion block being accumulated
#[derive(Default)]
struct SuggestionBlock {
    line: usize,
    id: u32,
    score: Option<String>,
    selected: Option<String>,
    resulting: Option<String>,
    removed: Option<String>,
    new_ids: Option<String>,
    condition: Option<String>,
}

impl SuggestionBlock {
    fn set_field(&mut self, line: &str) -> bool {
        let Some((name, value)) = line.split_once(':') else {
            return false;
        };
        let value = Some(value.trim().to_string());
        match name.trim() {
            "Score" => self.score = value,
            "SelectedDraftAtTimeOfEdit" => self.selected = value,
            "ResultingDraft" => self.resulting = value,
            "RemovedCharIds" => self.removed = value,
            "NewCharIds" => self.new_ids = value,
            "ConditionCharIds" => self.condition = value,
            _ => return false,
        }
        true
    }

    fn finish(self, table: &mut CharTable) -> Result<Suggestion, String> {
        let score = self
            .score
            .ok_or("missing Score")?
            .parse::<i64>()
            .map_err(|e| format!("bad score: {e}"))?;
        let selected = decode_chars(&self.selected.ok_or("missing SelectedDraftAtTimeOfEdit")?)?;
        let resulting = decode_chars(&self.resulting.ok_or("missing ResultingDraft")?)?;
        let removed_ids = id_set(self.removed.as_deref(), "RemovedCharIds")?;
        let new_ids = id_set(self.new_ids.as_deref(), "NewCharIds")?;
        let condition_ids = id_set(self.condition.as_deref(), "ConditionCharIds")?;

        // Validate every record before touching the table
        let mut pending = HashMap::new();
        for (id, ch) in selected.iter().chain(&resulting) {
            let existing = table.get(*id).or_else(|| pending.get(id).copied());
            if existing.is_some_and(|existing| existing != *ch) {
                return Err(format!("identity {id} conflicts with an earlier record"));
            }
            pending.insert(*id, *ch);
        }
        for (id, ch) in pending {
            let _ = table.register(id, ch);
        }

        Ok(Suggestion {
            id: self.id,
            selected: Draft::new(selected.into_iter().map(|(id, _)| id).collect()),
            resulting: Draft::new(resulting.into_iter().map(|(id, _)| id).collect()),
            removed_ids,
            new_ids,
            condition_ids,
            score,
        })
    }
}

fn id_set(value: Option<&str>, field: &str) -> Result<BTreeSet<CharId>, String> {
    let value = value.ok_or_else(|| format!("missing {field}"))?;
    parse_ids(value)
        .map(|ids| ids.into_iter().collect())
        .ok_or_else(|| format!("bad {field}: {value:?}"))
}

fn flush_suggestion(
    block: Option<SuggestionBlock>,
    table: &mut CharTable,
    suggestions: &mut Vec<Suggestion>,
) {
    let Some(block) = block else {
        return;
    };
    let line = block.line;
    match block.finish(table) {
        Ok(suggestion) => suggestions.push(suggestion),
        Err(cause) => warn!(line, %cause, "Skipping malformed suggestion"),
    }
}

/// Decode a persisted session
pub fn deserialize(text: &str) -> Result<Decoded, ParseError> {
    let mut table = CharTable::new();
    let mut section = Section::Preamble;
    let mut drafts: Vec<Draft> = Vec::new();
    let mut awaiting_draft: Option<usize> = None;
    let mut vectors: HashMap<String, ContributionVector> = HashMap::new();
    let mut awaiting_vector: Option<(usize, String)> = None;
    let mut suggestions = Vec::new();
    let mut block: Option<SuggestionBlock> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;

        if let Some(next) = section_for(raw) {
            if next <= section {
                return Err(ParseError::new(line_no, format!("unexpected section marker {raw:?}")));
            }
            section = next;
            continue;
        }

        match section {
            Section::Preamble => {
                if !raw.trim().is_empty() {
                    return Err(ParseError::new(line_no, "content before the first section"));
                }
            }
            Section::Texts => {}
            Section::Characters => {
                if block_number(raw, "DRAFT").is_some() {
                    if let Some(start) = awaiting_draft {
                        return Err(ParseError::new(start, "draft block without characters"));
                    }
                    awaiting_draft = Some(line_no);
                } else if awaiting_draft.take().is_some() {
                    drafts.push(decode_draft(raw, line_no, &mut table)?);
                } else if !raw.trim().is_empty() {
                    return Err(ParseError::new(line_no, "character line outside a draft block"));
                }
            }
            Section::Vectors => {
                if let Some(key) = raw.strip_prefix(DRAFT_KEY_PREFIX) {
                    if let Some((start, _)) = awaiting_vector.replace((line_no, key.trim().to_string())) {
                        warn!(line = start, "Skipping draft key without a vector");
                    }
                } else if let Some(value) = raw.strip_prefix("Vector:") {
                    match (awaiting_vector.take(), parse_vector(value)) {
                        (Some((_, key)), Some(vector)) => {
                            vectors.insert(key, vector);
                        }
                        _ => warn!(line = line_no, "Skipping malformed vector entry"),
                    }
                } else if !raw.trim().is_empty() {
                    warn!(line = line_no, "Ignoring unexpected line in vectors section");
                }
            }
            Section::Suggestions => {
                if let Some(id) = block_number(raw, "SUGGESTION") {
                    flush_suggestion(block.take(), &mut table, &mut suggestions);
                    block = Some(SuggestionBlock {
                        line: line_no,
                        id,
                        ..Default::default()
                    });
                } else if let Some(current) = block.as_mut() {
                    if !raw.trim().is_empty() && !current.set_field(raw) {
                        warn!(line = line_no, "Ignoring unknown suggestion field");
                    }
                } else if !raw.trim().is_empty() {
                    warn!(line = line_no, "Ignoring line outside a suggestion block");
                }
            }
        }
    }

    if section < Section::Characters {
        return Err(ParseError::new(0, format!("missing {CHARACTERS_MARKER} section")));
    }
    if let Some(start) = awaiting_draft {
        return Err(ParseError::new(start, "draft block without characters"));
    }
    flush_suggestion(block.take(), &mut table, &mut suggestions);

    let ledger = Ledger::from_suggestions(suggestions);
    let width = ledger.width();
    let mut set = DraftSet::new();
    for draft in drafts {
        let vector = match vectors.get(&draft.key()) {
            Some(vector) if vector.len() == width => vector.clone(),
            Some(vector) => {
                warn!(draft = %draft.key(), expected = width, found = vector.len(), "Resizing contribution vector");
                vector.resized(width)
            }
            None => ContributionVector::zeros(width),
        };
        if !set.insert(draft.clone(), vector) {
            warn!(draft = %draft.key(), "Skipping duplicate draft");
        }
    }

    Ok(Decoded {
        state: Snapshot { drafts: set, ledger },
        table,
    })
}

fn decode_draft(line: &str, line_no: usize, table: &mut CharTable) -> Result<Draft, ParseError> {
    let records = decode_chars(line).map_err(|cause| ParseError::new(line_no, cause))?;
    let mut ids = Vec::with_capacity(records.len());
    for (id, ch) in records {
        table
            .register(id, ch)
            .map_err(|existing| ParseError::conflicting_identity(line_no, id, existing, ch))?;
        ids.push(id);
    }
    Ok(Draft::new(ids))
}

fn parse_vector(value: &str) -> Option<ContributionVector> {
    let inner = value.trim().strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(ContributionVector::zeros(0));
    }
    inner
        .split(',')
        .map(|bit| match bit.trim() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        })
        .collect::<Option<Vec<bool>>>()
        .map(ContributionVector::from_bits)
}
