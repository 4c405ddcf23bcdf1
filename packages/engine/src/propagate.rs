//! # Propagation
//!
//! Replays an [`EditPlan`] on every draft of a [`DraftSet`].
//!
//! ```text
//! for each draft:
//!   gate        draft contains every gate segment?       no  -> untouched
//!   apply       operation finds its anchor?               no  -> untouched
//!   accept      result has alphanumeric content?          no  -> dropped
//!               result key not already in the new set?    no  -> dropped
//!               -> appended with parent vector + marker
//! ```
//!
//! The new set is built fresh: it starts as the old set with every vector
//! extended by a 0, and accepted drafts are appended after it. Source drafts
//! are never removed.

use crate::draft::{find_segment, Draft, DraftSet};
use crate::identity::{CharId, CharTable};
use crate::scope::{is_terminator, AnchorSpec, EditPlan, Operation};
use std::collections::HashSet;
use tracing::debug;

/// Result of replaying one plan across a draft set
#[derive(Debug, Clone)]
pub struct Propagation {
    /// The next draft set
    pub drafts: DraftSet,
    /// `(parent, child)` for every accepted draft, in acceptance order
    pub produced: Vec<(Draft, Draft)>,
    pub gated: usize,
    pub unmatched: usize,
    pub degenerate: usize,
    pub duplicates: usize,
    /// Whether any accepted draft received the sentence separator
    pub separator_used: bool,
}

impl Operation {
    /// Apply to one draft. `None` when the anchor is missing or nothing changed.
    pub fn apply(&self, draft: &Draft, table: &CharTable) -> Option<Draft> {
        let result = match self {
            Operation::Replace { anchor, inserted } => {
                let at = draft.find_segment(anchor)?;
                draft.splice(at..at + anchor.len(), inserted)
            }
            Operation::Anchored { specs, inserted } => apply_specs(draft, specs, inserted)?,
            Operation::AddSentence {
                context,
                inserted,
                separator,
            } => add_sentence(draft, table, context, inserted, *separator)?,
        };
        (result != *draft).then_some(result)
    }
}

fn apply_specs(draft: &Draft, specs: &[AnchorSpec], inserted: &[CharId]) -> Option<Draft> {
    let mut ids = draft.ids().to_vec();
    let mut matched = false;

    for spec in specs {
        if spec.segment().is_empty() {
            continue;
        }
        let Some(at) = find_segment(&ids, spec.segment()) else {
            debug!(draft = %draft.key(), "Anchor segment not found, skipping spec");
            continue;
        };
        match spec {
            AnchorSpec::Remove { segment } => {
                ids.drain(at..at + segment.len());
            }
            AnchorSpec::Insert { offset, .. } => {
                let point = at + offset;
                ids.splice(point..point, inserted.iter().copied());
            }
        }
        matched = true;
    }

    matched.then(|| Draft::new(ids))
}

fn add_sentence(
    draft: &Draft,
    table: &CharTable,
    context: &HashSet<CharId>,
    inserted: &[CharId],
    separator: Option<CharId>,
) -> Option<Draft> {
    let chars = table.chars(draft.ids());
    let anchor = draft.ids().iter().rposition(|id| context.contains(id));
    if anchor.is_none() && !context.is_empty() {
        debug!(draft = %draft.key(), "No context identity found, skipping sentence");
        return None;
    }
    let point = sentence_insertion_point(&chars, anchor);

    let mut insert = Vec::with_capacity(inserted.len() + 1);
    if let Some(separator) = separator.filter(|_| chars.get(point) == Some(&' ')) {
        insert.push(separator);
    }
    insert.extend_from_slice(inserted);

    Some(draft.splice(point..point, &insert))
}

/// Where a new sentence goes after the character at `anchor`.
///
/// Walks forward to the end of the enclosing sentence: just past a
/// terminator, or just before a newline. Without a boundary the sentence
/// goes right after the anchor; without an anchor it goes first.
pub fn sentence_insertion_point(chars: &[char], anchor: Option<usize>) -> usize {
    let Some(anchor) = anchor else {
        return 0;
    };
    if is_terminator(chars[anchor]) || chars[anchor] == '\n' {
        return anchor + 1;
    }
    for (i, ch) in chars.iter().enumerate().skip(anchor + 1) {
        if *ch == '\n' {
            return i;
        }
        if is_terminator(*ch) {
            return i + 1;
        }
    }
    anchor + 1
}

/// Whitespace/punctuation-only text counts as empty
pub fn is_content_empty(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || !trimmed.chars().any(char::is_alphanumeric)
}

/// Replay `plan` on every draft of `drafts`, marking accepted drafts with bit `index`
pub fn propagate(plan: &EditPlan, drafts: &DraftSet, table: &CharTable, index: usize) -> Propagation {
    let mut next = drafts.extended();
    let mut outcome = Propagation {
        drafts: DraftSet::new(),
        produced: Vec::new(),
        gated: 0,
        unmatched: 0,
        degenerate: 0,
        duplicates: 0,
        separator_used: false,
    };

    let separator = match &plan.operation {
        Operation::AddSentence { separator, .. } => *separator,
        _ => None,
    };

    for (draft, vector) in drafts.iter() {
        if !plan.gate.iter().all(|segment| draft.contains_segment(segment)) {
            outcome.gated += 1;
            continue;
        }

        let Some(child) = plan.operation.apply(draft, table) else {
            outcome.unmatched += 1;
            continue;
        };

        if is_content_empty(&table.text(child.ids())) {
            debug!(parent = %draft.key(), "Dropping content-empty result");
            outcome.degenerate += 1;
            continue;
        }

        if !next.insert(child.clone(), vector.extended().with_marker(index)) {
            debug!(child = %child.key(), "Result already present, keeping first");
            outcome.duplicates += 1;
            continue;
        }

        if let Some(separator) = separator {
            outcome.separator_used |= child.ids().contains(&separator);
        }
        outcome.produced.push((draft.clone(), child));
    }

    outcome.drafts = next;
    outcome
}
