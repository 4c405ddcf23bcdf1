//! # Edit Session
//!
//! Owns the whole working state of one author: the character arena, the
//! identity allocator, the draft set with its contribution vectors, the
//! suggestion ledger, lineage and undo history, plus selection and display
//! toggles.
//!
//! Every command either succeeds completely or returns an error before any
//! state is touched.

use crate::diff::TextDiff;
use crate::draft::{Draft, DraftSet};
use crate::errors::{EngineError, EngineResult, ParseError};
use crate::history::{History, Snapshot};
use crate::identity::{CharTable, IdAllocator};
use crate::ledger::{rank, ContributionVector, Ledger, Suggestion, Vote};
use crate::lineage::Lineage;
use crate::propagate::propagate;
use crate::scope::{plan_edit, ConditionPart};
use crate::serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Tunables for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Maximum undo depth (0 = unlimited)
    pub max_undo_levels: usize,
    pub sort_by_score: bool,
    pub hide_bad_edits: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_undo_levels: 100,
            sort_by_score: false,
            hide_bad_edits: false,
        }
    }
}

/// One visible draft, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftView {
    /// Position in the underlying draft set
    pub index: usize,
    pub key: String,
    pub text: String,
    pub score: i64,
    pub vector: String,
    pub selected: bool,
}

/// Nodes and parent → child edges among the visible drafts, as plain text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionView {
    pub id: u32,
    pub score: i64,
    pub selected_text: String,
    pub resulting_text: String,
    pub removed: usize,
    pub added: usize,
    pub conditions: usize,
}

/// What an applied edit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub suggestion_id: u32,
    /// Drafts the edit added to the set
    pub created: usize,
    /// Drafts that failed the condition gate
    pub gated: usize,
    /// Drafts where the anchor was not found
    pub unmatched: usize,
    /// Results dropped as content-empty
    pub degenerate: usize,
    /// Results dropped because the draft already existed
    pub duplicates: usize,
}

#[derive(Debug)]
pub struct EditSession {
    table: CharTable,
    ids: IdAllocator,
    state: Snapshot,
    lineage: Lineage,
    history: History,
    selected: Option<Draft>,
    options: SessionOptions,
}

impl EditSession {
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            table: CharTable::new(),
            ids: IdAllocator::new(),
            state: Snapshot::default(),
            lineage: Lineage::new(),
            history: History::with_max_levels(options.max_undo_levels),
            selected: None,
            options,
        }
    }

    /// Session seeded with a single root draft
    pub fn seeded(text: &str, options: SessionOptions) -> EngineResult<Self> {
        let mut session = Self::with_options(options);
        session.set_initial_draft(text)?;
        Ok(session)
    }

    /// Start over from `text` as the only (root) draft
    pub fn set_initial_draft(&mut self, text: &str) -> EngineResult<()> {
        if text.trim().is_empty() {
            return Err(EngineError::InputEmpty);
        }

        let mut table = CharTable::new();
        let mut ids = IdAllocator::new();
        let root = Draft::new(table.allocate(&mut ids, text));

        let mut drafts = DraftSet::new();
        drafts.insert(root.clone(), ContributionVector::zeros(0));

        self.table = table;
        self.ids = ids;
        self.state = Snapshot {
            drafts,
            ledger: Ledger::new(),
        };
        self.lineage = Lineage::roots([&root]);
        self.history.clear();
        self.selected = Some(root);

        info!(chars = text.chars().count(), "Seeded initial draft");
        Ok(())
    }

    /// Build a condition from characters `start..end` of the selected draft
    pub fn condition_part(&self, start: usize, end: usize) -> EngineResult<ConditionPart> {
        let draft = self.selected.as_ref().ok_or(EngineError::NoSelection)?;
        if start >= end || end > draft.len() {
            return Err(EngineError::InvalidRange {
                start,
                end,
                len: draft.len(),
            });
        }
        let ids = draft.ids()[start..end].to_vec();
        let text = self.table.text(&ids);
        Ok(ConditionPart { ids, text })
    }

    /// Apply `new_text` as an edit of the selected draft and propagate it
    pub fn apply_edit(
        &mut self,
        new_text: &str,
        conditions: &[ConditionPart],
    ) -> EngineResult<EditOutcome> {
        let selected = self.selected.clone().ok_or(EngineError::NoSelection)?;
        let diff = TextDiff::compute(&self.table.text(selected.ids()), new_text);
        if diff.is_noop() {
            return Err(EngineError::NoChange);
        }
        debug!(
            prefix = diff.prefix_len,
            removed = diff.removed_len,
            inserted = %diff.inserted,
            "Computed edit"
        );

        self.history.push(self.state.clone());

        let plan = plan_edit(&selected, &diff, conditions, &mut self.table, &mut self.ids);
        let index = self.state.ledger.width();
        let propagation = propagate(&plan, &self.state.drafts, &self.table, index);

        let resulting = plan
            .gate
            .iter()
            .all(|segment| selected.contains_segment(segment))
            .then(|| plan.operation.apply(&selected, &self.table))
            .flatten()
            .unwrap_or_else(|| selected.clone());
        let suggestion_id = self.state.ledger.record(
            selected.clone(),
            resulting.clone(),
            plan.removed_ids.iter().copied().collect(),
            plan.new_ids(propagation.separator_used),
            plan.condition_ids(),
        );

        for (parent, child) in &propagation.produced {
            self.lineage.add(Some(parent.clone()), child.clone());
        }
        self.state.drafts = propagation.drafts;
        if self.state.drafts.contains(&resulting) {
            self.selected = Some(resulting);
        }

        let outcome = EditOutcome {
            suggestion_id,
            created: propagation.produced.len(),
            gated: propagation.gated,
            unmatched: propagation.unmatched,
            degenerate: propagation.degenerate,
            duplicates: propagation.duplicates,
        };
        info!(
            suggestion = suggestion_id,
            created = outcome.created,
            gated = outcome.gated,
            unmatched = outcome.unmatched,
            degenerate = outcome.degenerate,
            duplicates = outcome.duplicates,
            "Applied edit"
        );
        Ok(outcome)
    }

    pub fn vote(&mut self, suggestion_id: u32, vote: Vote) -> EngineResult<i64> {
        let score = self.state.ledger.vote(suggestion_id, vote)?;
        info!(suggestion = suggestion_id, score, "Recorded vote");
        Ok(score)
    }

    /// Restore the state before the last edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.state.clone()) {
            Some(previous) => {
                self.restore(previous);
                info!(drafts = self.state.drafts.len(), "Undo");
                true
            }
            None => false,
        }
    }

    /// Reapply the last undone edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.state.clone()) {
            Some(next) => {
                self.restore(next);
                info!(drafts = self.state.drafts.len(), "Redo");
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.state = snapshot;
        self.selected = self.state.drafts.first().cloned();
    }

    pub fn select_draft(&mut self, key: &str) -> EngineResult<()> {
        let draft = self
            .state
            .drafts
            .find_by_key(key)
            .ok_or_else(|| EngineError::UnknownDraft(key.to_string()))?;
        self.selected = Some(draft.clone());
        Ok(())
    }

    /// Select by position in the underlying draft set
    pub fn select_index(&mut self, index: usize) -> EngineResult<()> {
        let (draft, _) = self
            .state
            .drafts
            .get_index(index)
            .ok_or_else(|| EngineError::UnknownDraft(format!("#{index}")))?;
        self.selected = Some(draft.clone());
        Ok(())
    }

    pub fn toggle_hide_bad_edits(&mut self) -> bool {
        self.options.hide_bad_edits = !self.options.hide_bad_edits;
        self.options.hide_bad_edits
    }

    pub fn toggle_sort_by_score(&mut self) -> bool {
        self.options.sort_by_score = !self.options.sort_by_score;
        self.options.sort_by_score
    }

    /// Replace the whole state with a decoded file. On error nothing changes.
    pub fn load(&mut self, bytes: &[u8]) -> EngineResult<()> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ParseError::new(0, format!("file is not UTF-8: {e}")))?;
        let decoded = serializer::deserialize(text)?;

        self.ids = IdAllocator::after(decoded.table.max_id());
        self.table = decoded.table;
        self.state = decoded.state;
        self.lineage = Lineage::derive(&self.state.drafts, &self.state.ledger);
        self.history.clear();
        self.selected = self.state.drafts.first().cloned();

        info!(
            drafts = self.state.drafts.len(),
            suggestions = self.state.ledger.len(),
            "Loaded session"
        );
        Ok(())
    }

    pub fn save(&self) -> Vec<u8> {
        serializer::serialize(&self.state, &self.table).into_bytes()
    }

    /// Drafts after the hide/sort toggles, in display order
    pub fn visible_drafts(&self) -> Vec<DraftView> {
        let ledger = &self.state.ledger;
        let mut ranked: Vec<(DraftView, usize, usize)> = self
            .state
            .drafts
            .iter()
            .enumerate()
            .filter(|(_, (_, vector))| !(self.options.hide_bad_edits && ledger.is_bad(vector)))
            .map(|(index, (draft, vector))| {
                let view = DraftView {
                    index,
                    key: draft.key(),
                    text: self.table.text(draft.ids()),
                    score: ledger.draft_score(vector),
                    vector: vector.to_string(),
                    selected: self.selected.as_ref() == Some(draft),
                };
                (view, vector.ones(), draft.len())
            })
            .collect();

        if self.options.sort_by_score {
            ranked.sort_by(|a, b| rank((a.0.score, a.1, a.2), (b.0.score, b.1, b.2)));
        }

        ranked.into_iter().map(|(view, _, _)| view).collect()
    }

    /// Lineage graph restricted to the visible drafts
    pub fn graph(&self) -> GraphView {
        let visible: Vec<&Draft> = self
            .visible_drafts()
            .iter()
            .filter_map(|view| self.state.drafts.get_index(view.index).map(|(draft, _)| draft))
            .collect();
        let visible_set: HashSet<&Draft> = visible.iter().copied().collect();

        let mut graph = GraphView {
            nodes: visible.iter().map(|d| self.table.text(d.ids())).collect(),
            edges: Vec::new(),
        };
        for (from, to) in self.lineage.visible_pairs(&visible_set) {
            let edge = (self.table.text(from.ids()), self.table.text(to.ids()));
            if !graph.edges.contains(&edge) {
                graph.edges.push(edge);
            }
        }
        graph
    }

    pub fn suggestions(&self) -> Vec<SuggestionView> {
        self.state
            .ledger
            .iter()
            .map(|s| SuggestionView {
                id: s.id,
                score: s.score,
                selected_text: self.table.text(s.selected.ids()),
                resulting_text: self.table.text(s.resulting.ids()),
                removed: s.removed_ids.len(),
                added: s.new_ids.len(),
                conditions: s.condition_ids.len(),
            })
            .collect()
    }

    pub fn selection_summary(&self) -> String {
        let Some(draft) = &self.selected else {
            return "No draft selected".to_string();
        };
        let vector = self
            .state
            .drafts
            .vector(draft)
            .cloned()
            .unwrap_or_default();
        let position = self.state.drafts.position(draft).map_or(0, |i| i + 1);
        format!(
            "Draft {} of {} | Score: {} | Vector: {}",
            position,
            self.state.drafts.len(),
            self.state.ledger.draft_score(&vector),
            vector
        )
    }

    pub fn selected(&self) -> Option<&Draft> {
        self.selected.as_ref()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selected.as_ref().map(|d| self.table.text(d.ids()))
    }

    pub fn text_of(&self, draft: &Draft) -> String {
        self.table.text(draft.ids())
    }

    pub fn drafts(&self) -> &DraftSet {
        &self.state.drafts
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn suggestion(&self, id: u32) -> Option<&Suggestion> {
        self.state.ledger.get(id)
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_levels(&self) -> usize {
        self.history.undo_levels()
    }

    pub fn redo_levels(&self) -> usize {
        self.history.redo_levels()
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
