//! # Structural Diff
//!
//! Reduces an `(old text, new text)` pair to a single splice: a common
//! prefix, a removed span, the inserted text and a common suffix. This is a
//! greedy longest-common-affix diff, which is enough because user edits are
//! localized.
//!
//! ## Space correction
//!
//! When the character just before the prefix boundary is a space in both
//! texts, the boundary is tried one character earlier. The shifted split is
//! kept when it removes the same span and either moves a space to the front
//! of the inserted text, inserts more, or places the surrounding spaces
//! better. Typing `"big "` into `"The cat"` then reads as inserting `" big"`
//! after `"The"`.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    /// Characters shared at the start of both texts
    pub prefix_len: usize,
    /// Characters shared at the end of both texts, not overlapping the prefix
    pub suffix_len: usize,
    /// Characters of the old text between prefix and suffix
    pub removed_len: usize,
    /// Text of the new text between prefix and suffix
    pub inserted: String,
}

impl TextDiff {
    pub fn compute(old: &str, new: &str) -> Self {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();

        let prefix = common_prefix(&old, &new);
        let diff = split_at(&old, &new, prefix);

        if prefix > 0 && old[prefix - 1] == ' ' && new[prefix - 1] == ' ' {
            let shifted = split_at(&old, &new, prefix - 1);
            if shifted.removed_len == diff.removed_len && shifted.improves_on(&diff) {
                return shifted;
            }
        }

        diff
    }

    /// Character range of the old text that the edit removes
    pub fn removed_range(&self) -> Range<usize> {
        self.prefix_len..self.prefix_len + self.removed_len
    }

    pub fn is_noop(&self) -> bool {
        self.removed_len == 0 && self.inserted.is_empty()
    }

    pub fn is_replacement(&self) -> bool {
        self.removed_len > 0 && !self.inserted.is_empty()
    }

    fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }

    fn improves_on(&self, other: &TextDiff) -> bool {
        let leads = self.inserted.starts_with(' ');
        if leads && !other.inserted.starts_with(' ') {
            return true;
        }
        if self.inserted_len() > other.inserted_len() {
            return true;
        }
        self.inserted.trim() == other.inserted.trim()
            && space_placement(&self.inserted) > space_placement(&other.inserted)
    }
}

/// Leading spaces count in favour, trailing spaces against
fn space_placement(text: &str) -> i8 {
    i8::from(text.starts_with(' ')) - i8::from(text.ends_with(' '))
}

fn common_prefix(old: &[char], new: &[char]) -> usize {
    old.iter().zip(new).take_while(|(a, b)| a == b).count()
}

fn common_suffix(old: &[char], new: &[char], prefix: usize) -> usize {
    let limit = old.len().min(new.len()) - prefix;
    old.iter()
        .rev()
        .zip(new.iter().rev())
        .take(limit)
        .take_while(|(a, b)| a == b)
        .count()
}

fn split_at(old: &[char], new: &[char], prefix: usize) -> TextDiff {
    let suffix = common_suffix(old, new, prefix);
    TextDiff {
        prefix_len: prefix,
        suffix_len: suffix,
        removed_len: old.len() - prefix - suffix,
        inserted: new[prefix..new.len() - suffix].iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement() {
        let diff = TextDiff::compute("The cat sat.", "The dog sat.");

        assert_eq!(diff.prefix_len, 4);
        assert_eq!(diff.suffix_len, 5);
        assert_eq!(diff.removed_len, 3);
        assert_eq!(diff.inserted, "dog");
        assert!(diff.is_replacement());
    }

    #[test]
    fn test_insertion_moves_space_to_front() {
        let diff = TextDiff::compute("The cat sat.", "The big cat sat.");

        assert_eq!(diff.prefix_len, 3);
        assert_eq!(diff.removed_len, 0);
        assert_eq!(diff.inserted, " big");
        assert_eq!(diff.suffix_len, 9);
    }

    #[test]
    fn test_shift_prefers_leading_space_for_same_content() {
        // Both splits insert " X " around the same word; the shifted one
        // leads with its spaces instead of trailing one
        let diff = TextDiff::compute("a b", "a  X b");

        assert_eq!(diff.prefix_len, 1);
        assert_eq!(diff.inserted, "  X");
        assert_eq!(diff.suffix_len, 2);
        assert_eq!(diff.removed_len, 0);
    }

    #[test]
    fn test_sentence_insertion_after_terminator() {
        let diff = TextDiff::compute("A. B.", "A. X. B.");

        assert_eq!(diff.prefix_len, 2);
        assert_eq!(diff.inserted, " X.");
        assert_eq!(diff.removed_len, 0);
    }

    #[test]
    fn test_removal() {
        let diff = TextDiff::compute("The big cat sat.", "The cat sat.");

        assert_eq!(diff.removed_len, 4);
        assert!(diff.inserted.is_empty());
        assert_eq!(diff.removed_range(), 4..8);
    }

    #[test]
    fn test_append_and_prepend() {
        let append = TextDiff::compute("abc", "abcdef");
        assert_eq!((append.prefix_len, append.suffix_len), (3, 0));
        assert_eq!(append.inserted, "def");

        let prepend = TextDiff::compute("abc", "xyabc");
        assert_eq!((prepend.prefix_len, prepend.suffix_len), (0, 3));
        assert_eq!(prepend.inserted, "xy");
    }

    #[test]
    fn test_repeated_characters_do_not_overlap() {
        let diff = TextDiff::compute("aaa", "aaaa");

        assert_eq!(diff.prefix_len + diff.suffix_len, 3);
        assert_eq!(diff.removed_len, 0);
        assert_eq!(diff.inserted, "a");
    }

    #[test]
    fn test_identical_text_is_noop() {
        assert!(TextDiff::compute("same", "same").is_noop());
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let diff = TextDiff::compute("día uno", "día dos");

        assert_eq!(diff.prefix_len, 4);
        assert_eq!(diff.removed_len, 3);
        assert_eq!(diff.inserted, "dos");
    }
}
