//! # Scope Inference
//!
//! Turns a [`TextDiff`] on the selected draft into an [`EditPlan`]: the
//! anchored [`Operation`] to replay on every draft, and the identity
//! segments a draft must contain for the operation to apply to it.
//!
//! - Removals and replacements are anchored to the removed identity segment.
//! - Pure insertions are anchored to the enclosing sentence (text up to one
//!   of `.?!;:`), or the enclosing paragraph when no sentence contains the
//!   insertion point, with an offset relative to that segment.
//! - Sentence additions (inserted text ending in a terminator) are anchored
//!   to the identities preceding the insertion point instead.
//!
//! Explicit condition parts replace the inferred gate but never the anchor.

use crate::diff::TextDiff;
use crate::draft::Draft;
use crate::identity::{CharId, CharTable, IdAllocator};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

pub const SENTENCE_TERMINATORS: [char; 5] = ['.', '?', '!', ';', ':'];

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.?!;:]+[.?!;:]").expect("sentence pattern compiles"));

pub fn is_terminator(ch: char) -> bool {
    SENTENCE_TERMINATORS.contains(&ch)
}

/// Explicit scoping selection: only drafts containing `ids` are edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionPart {
    pub ids: Vec<CharId>,
    pub text: String,
}

/// A single anchored instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorSpec {
    /// Excise the segment
    Remove { segment: Vec<CharId> },
    /// Insert the operation's new characters at `offset` within the segment
    Insert { segment: Vec<CharId>, offset: usize },
}

impl AnchorSpec {
    pub fn segment(&self) -> &[CharId] {
        match self {
            AnchorSpec::Remove { segment } | AnchorSpec::Insert { segment, .. } => segment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Swap the first occurrence of `anchor` for `inserted`
    Replace {
        anchor: Vec<CharId>,
        inserted: Vec<CharId>,
    },
    /// Apply each spec in order, skipping specs whose segment is absent
    Anchored {
        specs: Vec<AnchorSpec>,
        inserted: Vec<CharId>,
    },
    /// Add a sentence after the sentence enclosing the last context identity
    AddSentence {
        context: HashSet<CharId>,
        inserted: Vec<CharId>,
        /// Space placed before `inserted` when it lands on an existing space
        separator: Option<CharId>,
    },
}

/// Everything propagation needs to replay one edit
#[derive(Debug, Clone)]
pub struct EditPlan {
    pub operation: Operation,
    /// Segments a draft must contain to be edited
    pub gate: Vec<Vec<CharId>>,
    pub removed_ids: Vec<CharId>,
}

impl EditPlan {
    /// Identities recorded as the suggestion's conditions
    pub fn condition_ids(&self) -> BTreeSet<CharId> {
        let gate = self.gate.iter().flatten().copied();
        match &self.operation {
            Operation::AddSentence { context, .. } if self.gate.is_empty() => {
                context.iter().copied().collect()
            }
            _ => gate.collect(),
        }
    }

    /// Fresh identities the edit introduced
    pub fn new_ids(&self, separator_used: bool) -> BTreeSet<CharId> {
        match &self.operation {
            Operation::Replace { inserted, .. } | Operation::Anchored { inserted, .. } => {
                inserted.iter().copied().collect()
            }
            Operation::AddSentence {
                inserted,
                separator,
                ..
            } => inserted
                .iter()
                .copied()
                .chain(separator.filter(|_| separator_used))
                .collect(),
        }
    }
}

/// Inserted text ending in a terminator, with nothing removed
pub fn is_sentence_addition(diff: &TextDiff) -> bool {
    let trimmed = diff.inserted.trim();
    diff.removed_len == 0 && trimmed.chars().last().is_some_and(is_terminator)
}

/// Build the plan for `diff` applied to `draft`.
///
/// Allocates the inserted characters once; every draft the edit reaches
/// shares them.
pub fn plan_edit(
    draft: &Draft,
    diff: &TextDiff,
    conditions: &[ConditionPart],
    table: &mut CharTable,
    ids: &mut IdAllocator,
) -> EditPlan {
    let removed_ids = draft.ids()[diff.removed_range()].to_vec();
    let inserted = table.allocate(ids, &diff.inserted);
    let explicit: Vec<Vec<CharId>> = conditions
        .iter()
        .filter(|part| !part.ids.is_empty())
        .map(|part| part.ids.clone())
        .collect();

    if is_sentence_addition(diff) {
        let separator = if diff.inserted.starts_with(' ') {
            None
        } else {
            table.allocate(ids, " ").first().copied()
        };
        return EditPlan {
            operation: Operation::AddSentence {
                context: draft.ids()[..diff.prefix_len].iter().copied().collect(),
                inserted,
                separator,
            },
            gate: explicit,
            removed_ids,
        };
    }

    let (operation, inferred) = if diff.is_replacement() {
        let operation = Operation::Replace {
            anchor: removed_ids.clone(),
            inserted,
        };
        (operation, removed_ids.clone())
    } else {
        let spec = if diff.removed_len > 0 {
            AnchorSpec::Remove {
                segment: removed_ids.clone(),
            }
        } else {
            insertion_spec(draft, table, diff.prefix_len)
        };
        let segment = spec.segment().to_vec();
        let operation = Operation::Anchored {
            specs: vec![spec],
            inserted,
        };
        (operation, segment)
    };

    let gate = if explicit.is_empty() {
        vec![inferred]
    } else {
        explicit
    };

    EditPlan {
        operation,
        gate,
        removed_ids,
    }
}

/// Anchor an insertion at `point` to its sentence, or failing that its paragraph
pub fn insertion_spec(draft: &Draft, table: &CharTable, point: usize) -> AnchorSpec {
    let ids = draft.ids();
    let chars = table.chars(ids);
    let (start, end) = paragraph_bounds(&chars, point);

    let sentence = sentence_spans(&chars[start..end])
        .into_iter()
        .map(|(s, e)| (s + start, e + start))
        .find(|(s, e)| *s <= point && point < *e);

    if let Some((s, e)) = sentence {
        return AnchorSpec::Insert {
            segment: ids[s..e].to_vec(),
            offset: point - s,
        };
    }

    // Empty paragraph: key to the newline that opens it, or closes it at
    // the start of the draft
    if start == end && point > 0 {
        return AnchorSpec::Insert {
            segment: vec![ids[point - 1]],
            offset: 1,
        };
    }
    if start == end && end < ids.len() {
        return AnchorSpec::Insert {
            segment: vec![ids[end]],
            offset: 0,
        };
    }

    AnchorSpec::Insert {
        segment: ids[start..end].to_vec(),
        offset: point - start,
    }
}

/// Paragraph containing `point`, delimited by newlines or the draft ends
pub fn paragraph_bounds(chars: &[char], point: usize) -> (usize, usize) {
    let start = chars[..point]
        .iter()
        .rposition(|ch| *ch == '\n')
        .map_or(0, |i| i + 1);
    let end = chars[point..]
        .iter()
        .position(|ch| *ch == '\n')
        .map_or(chars.len(), |i| point + i);
    (start, end)
}

/// Character spans of every sentence match in `chars`
pub fn sentence_spans(chars: &[char]) -> Vec<(usize, usize)> {
    let text: String = chars.iter().collect();
    let mut spans = Vec::new();
    let mut consumed_bytes = 0;
    let mut consumed_chars = 0;

    for found in SENTENCE.find_iter(&text) {
        consumed_chars += text[consumed_bytes..found.start()].chars().count();
        let len = found.as_str().chars().count();
        spans.push((consumed_chars, consumed_chars + len));
        consumed_chars += len;
        consumed_bytes = found.end();
    }

    spans
}
