//! # Drafts
//!
//! A [`Draft`] is an immutable sequence of character identities. Its key is
//! the identity sequence itself, so two drafts with the same text but
//! different provenance are distinct, while two edit paths that converge on
//! the same identities collapse into one draft.
//!
//! A [`DraftSet`] is the ordered working collection of live drafts. Each
//! entry carries the draft's contribution vector, which keeps "every live
//! draft has a vector" true by construction.

use crate::identity::CharId;
use crate::ledger::ContributionVector;
use indexmap::IndexMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Immutable identity sequence
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Draft {
    ids: Arc<[CharId]>,
}

impl Draft {
    pub fn new(ids: Vec<CharId>) -> Self {
        Self { ids: ids.into() }
    }

    pub fn ids(&self) -> &[CharId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Comma-joined identity sequence
    pub fn key(&self) -> String {
        join_ids(self.ids.iter())
    }

    /// Position of the first contiguous occurrence of `segment`
    pub fn find_segment(&self, segment: &[CharId]) -> Option<usize> {
        find_segment(&self.ids, segment)
    }

    pub fn contains_segment(&self, segment: &[CharId]) -> bool {
        self.find_segment(segment).is_some()
    }

    /// New draft with `range` replaced by `insert`
    pub fn splice(&self, range: Range<usize>, insert: &[CharId]) -> Draft {
        let mut ids = Vec::with_capacity(self.ids.len() - range.len() + insert.len());
        ids.extend_from_slice(&self.ids[..range.start]);
        ids.extend_from_slice(insert);
        ids.extend_from_slice(&self.ids[range.end..]);
        Draft::new(ids)
    }
}

impl fmt::Debug for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Draft[{}]", self.key())
    }
}

/// First position at which `needle` occurs contiguously in `haystack`.
///
/// An empty needle matches at position 0.
pub fn find_segment(haystack: &[CharId], needle: &[CharId]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

pub fn join_ids<'a>(ids: impl IntoIterator<Item = &'a CharId>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a comma-joined identity list; an empty string is an empty list
pub fn parse_ids(text: &str) -> Option<Vec<CharId>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Vec::new());
    }
    text.split(',').map(|part| part.parse().ok()).collect()
}

/// Ordered set of live drafts with their contribution vectors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftSet {
    entries: IndexMap<Draft, ContributionVector>,
}

impl DraftSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a draft unless its key is already present (first writer wins)
    pub fn insert(&mut self, draft: Draft, vector: ContributionVector) -> bool {
        if self.entries.contains_key(&draft) {
            return false;
        }
        self.entries.insert(draft, vector);
        true
    }

    pub fn contains(&self, draft: &Draft) -> bool {
        self.entries.contains_key(draft)
    }

    pub fn vector(&self, draft: &Draft) -> Option<&ContributionVector> {
        self.entries.get(draft)
    }

    pub fn position(&self, draft: &Draft) -> Option<usize> {
        self.entries.get_index_of(draft)
    }

    pub fn get_index(&self, index: usize) -> Option<(&Draft, &ContributionVector)> {
        self.entries.get_index(index)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&Draft> {
        let ids = parse_ids(key)?;
        let probe = Draft::new(ids);
        self.entries.get_key_value(&probe).map(|(draft, _)| draft)
    }

    pub fn first(&self) -> Option<&Draft> {
        self.entries.keys().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Draft, &ContributionVector)> {
        self.entries.iter()
    }

    pub fn drafts(&self) -> impl Iterator<Item = &Draft> {
        self.entries.keys()
    }

    /// Copy of this set with every vector extended by a trailing 0
    pub fn extended(&self) -> DraftSet {
        DraftSet {
            entries: self
                .entries
                .iter()
                .map(|(draft, vector)| (draft.clone(), vector.extended()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
