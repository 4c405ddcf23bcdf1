//! # Suggestion Ledger
//!
//! One [`Suggestion`] is recorded per user-initiated edit. Suggestions are
//! append-only except for their vote score.
//!
//! Every live draft carries a [`ContributionVector`]: bit `k` is set when
//! suggestion `k + 1` created the draft or one of its ancestors. Draft
//! scores and the "bad edit" filter are derived from those bits and the
//! suggestion scores.

use crate::draft::Draft;
use crate::errors::{EngineError, EngineResult};
use crate::identity::CharId;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Per-draft bitset of contributing suggestions
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContributionVector(Vec<bool>);

impl ContributionVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Number of set bits
    pub fn ones(&self) -> usize {
        self.0.iter().filter(|bit| **bit).count()
    }

    /// Copy with a trailing 0
    pub fn extended(&self) -> Self {
        let mut bits = self.0.clone();
        bits.push(false);
        Self(bits)
    }

    /// Copy with bit `index` set, growing the vector if needed
    pub fn with_marker(&self, index: usize) -> Self {
        let mut bits = self.0.clone();
        if bits.len() <= index {
            bits.resize(index + 1, false);
        }
        bits[index] = true;
        Self(bits)
    }

    /// Copy padded with zeros or truncated to `len`
    pub fn resized(&self, len: usize) -> Self {
        let mut bits = self.0.clone();
        bits.resize(len, false);
        Self(bits)
    }

    /// Suggestion ids whose bit is set
    pub fn suggestion_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .map(|(index, _)| index as u32 + 1)
    }
}

impl fmt::Display for ContributionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: Vec<&str> = self.0.iter().map(|bit| if *bit { "1" } else { "0" }).collect();
        write!(f, "[{}]", bits.join(","))
    }
}

/// Ledger record of one user-initiated edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: u32,
    /// The edited draft, frozen at edit time
    pub selected: Draft,
    /// What the edited draft became, frozen at edit time
    pub resulting: Draft,
    pub removed_ids: BTreeSet<CharId>,
    pub new_ids: BTreeSet<CharId>,
    pub condition_ids: BTreeSet<CharId>,
    pub score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    fn delta(self) -> i64 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

/// Suggestions ordered by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    suggestions: Vec<Suggestion>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from decoded suggestions; later duplicates of an id are dropped
    pub fn from_suggestions(mut suggestions: Vec<Suggestion>) -> Self {
        suggestions.sort_by_key(|s| s.id);
        suggestions.dedup_by_key(|s| s.id);
        Self { suggestions }
    }

    /// Length every contribution vector must have: the highest suggestion id
    pub fn width(&self) -> usize {
        self.suggestions.last().map_or(0, |s| s.id as usize)
    }

    pub fn next_id(&self) -> u32 {
        self.width() as u32 + 1
    }

    /// Append a suggestion with initial score 1 and return its id
    pub fn record(
        &mut self,
        selected: Draft,
        resulting: Draft,
        removed_ids: BTreeSet<CharId>,
        new_ids: BTreeSet<CharId>,
        condition_ids: BTreeSet<CharId>,
    ) -> u32 {
        let id = self.next_id();
        self.suggestions.push(Suggestion {
            id,
            selected,
            resulting,
            removed_ids,
            new_ids,
            condition_ids,
            score: 1,
        });
        id
    }

    pub fn get(&self, id: u32) -> Option<&Suggestion> {
        self.suggestions
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|index| &self.suggestions[index])
    }

    /// Adjust the score of suggestion `id`; returns the new score
    pub fn vote(&mut self, id: u32, vote: Vote) -> EngineResult<i64> {
        let index = self
            .suggestions
            .binary_search_by_key(&id, |s| s.id)
            .map_err(|_| EngineError::UnknownSuggestion(id))?;
        let suggestion = &mut self.suggestions[index];
        suggestion.score += vote.delta();
        Ok(suggestion.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// 1 + the scores of every contributing suggestion
    pub fn draft_score(&self, vector: &ContributionVector) -> i64 {
        1 + vector
            .suggestion_ids()
            .filter_map(|id| self.get(id))
            .map(|s| s.score)
            .sum::<i64>()
    }

    /// Whether any contributing suggestion has been voted below 1
    pub fn is_bad(&self, vector: &ContributionVector) -> bool {
        vector
            .suggestion_ids()
            .filter_map(|id| self.get(id))
            .any(|s| s.score < 1)
    }
}

/// Score ordering: score, then set bits, then character length; all descending
pub fn rank(a: (i64, usize, usize), b: (i64, usize, usize)) -> Ordering {
    b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(b.2.cmp(&a.2))
}
