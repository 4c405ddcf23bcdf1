//! Parent → child edges between drafts

use crate::draft::{Draft, DraftSet};
use crate::ledger::{ContributionVector, Ledger};
use std::cmp::Reverse;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageEdge {
    /// `None` marks a root draft
    pub from: Option<Draft>,
    pub to: Draft,
}

#[derive(Debug, Clone, Default)]
pub struct Lineage {
    edges: Vec<LineageEdge>,
}

impl Lineage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lineage where every draft is a root
    pub fn roots<'a>(drafts: impl IntoIterator<Item = &'a Draft>) -> Self {
        let mut lineage = Self::new();
        for draft in drafts {
            lineage.add(None, draft.clone());
        }
        lineage
    }

    /// Rebuild edges from contribution vectors.
    ///
    /// A draft whose last set bit is `k` came out of suggestion `k + 1`, from
    /// a draft carrying the same vector with bit `k` cleared. Among several
    /// such drafts the suggestion's own selected draft wins, then the one
    /// sharing the longest identity prefix and suffix. Drafts without a
    /// live parent are roots.
    pub fn derive(drafts: &DraftSet, ledger: &Ledger) -> Self {
        let mut lineage = Self::new();

        for (draft, vector) in drafts.iter() {
            let Some(bit) = vector.bits().iter().rposition(|set| *set) else {
                lineage.add(None, draft.clone());
                continue;
            };

            let mut bits = vector.bits().to_vec();
            bits[bit] = false;
            let parent_vector = ContributionVector::from_bits(bits);
            let selected = u32::try_from(bit + 1)
                .ok()
                .and_then(|id| ledger.get(id))
                .filter(|s| s.resulting == *draft)
                .map(|s| &s.selected);

            let parent = drafts
                .iter()
                .filter(|(candidate, v)| **v == parent_vector && *candidate != draft)
                .map(|(candidate, _)| candidate)
                .min_by_key(|candidate| {
                    Reverse((Some(*candidate) == selected, shared_ends(candidate, draft)))
                });
            lineage.add(parent.cloned(), draft.clone());
        }

        lineage
    }

    /// Record an edge; repeated edges are kept once
    pub fn add(&mut self, from: Option<Draft>, to: Draft) {
        let edge = LineageEdge { from, to };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    pub fn edges(&self) -> &[LineageEdge] {
        &self.edges
    }

    /// Parent → child pairs with both ends in `visible`
    pub fn visible_pairs<'a>(
        &'a self,
        visible: &'a HashSet<&Draft>,
    ) -> impl Iterator<Item = (&'a Draft, &'a Draft)> + 'a {
        self.edges.iter().filter_map(move |edge| {
            let from = edge.from.as_ref()?;
            (visible.contains(from) && visible.contains(&edge.to)).then_some((from, &edge.to))
        })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Length of the common identity prefix plus common suffix
fn shared_ends(a: &Draft, b: &Draft) -> usize {
    let (a, b) = (a.ids(), b.ids());
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    prefix + suffix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::CharId;
    use std::collections::BTreeSet;

    fn draft(raw: &[u64]) -> Draft {
        Draft::new(raw.iter().map(|n| CharId::new(*n)).collect())
    }

    #[test]
    fn test_edges_are_deduplicated() {
        let mut lineage = Lineage::roots([&draft(&[1])]);
        lineage.add(Some(draft(&[1])), draft(&[1, 2]));
        lineage.add(Some(draft(&[1])), draft(&[1, 2]));

        assert_eq!(lineage.len(), 2);
        assert!(lineage.edges()[0].from.is_none());
    }

    #[test]
    fn test_visible_pairs_skip_hidden_and_roots() {
        let root = draft(&[1]);
        let child = draft(&[1, 2]);
        let grandchild = draft(&[1, 2, 3]);

        let mut lineage = Lineage::roots([&root]);
        lineage.add(Some(root.clone()), child.clone());
        lineage.add(Some(child.clone()), grandchild.clone());

        let visible: HashSet<&Draft> = [&root, &child].into_iter().collect();
        let pairs: Vec<_> = lineage.visible_pairs(&visible).collect();

        assert_eq!(pairs, vec![(&root, &child)]);
    }

    #[test]
    fn test_derive_from_vectors() {
        let root = draft(&[1, 2, 3]);
        let sibling = draft(&[1, 4, 3]);
        let child = draft(&[1, 5, 3]);
        let grandchild = draft(&[1, 5, 3, 6]);
        let bits = |raw: &[bool]| ContributionVector::from_bits(raw.to_vec());

        let mut ledger = Ledger::new();
        ledger.record(
            root.clone(),
            child.clone(),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
        );
        ledger.record(
            child.clone(),
            grandchild.clone(),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
        );

        let mut drafts = DraftSet::new();
        drafts.insert(root.clone(), bits(&[false, false]));
        drafts.insert(sibling.clone(), bits(&[false, false]));
        drafts.insert(child.clone(), bits(&[true, false]));
        drafts.insert(grandchild.clone(), bits(&[true, true]));

        let lineage = Lineage::derive(&drafts, &ledger);
        let pairs: Vec<(Option<&Draft>, &Draft)> = lineage
            .edges()
            .iter()
            .map(|edge| (edge.from.as_ref(), &edge.to))
            .collect();

        assert_eq!(
            pairs,
            vec![
                (None, &root),
                (None, &sibling),
                (Some(&root), &child),
                (Some(&child), &grandchild),
            ]
        );
    }

    #[test]
    fn test_derive_prefers_closest_candidate() {
        let far = draft(&[7, 8, 9]);
        let near = draft(&[1, 2, 3]);
        let child = draft(&[1, 2, 4]);
        let bits = |raw: &[bool]| ContributionVector::from_bits(raw.to_vec());

        // No ledger entry names the child, so identity overlap decides
        let mut drafts = DraftSet::new();
        drafts.insert(far.clone(), bits(&[false]));
        drafts.insert(near.clone(), bits(&[false]));
        drafts.insert(child.clone(), bits(&[true]));

        let lineage = Lineage::derive(&drafts, &Ledger::new());
        assert_eq!(lineage.edges()[2].from.as_ref(), Some(&near));
    }
}
