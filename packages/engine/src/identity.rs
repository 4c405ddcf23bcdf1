//! # Character Identities
//!
//! Every character of every draft is a record `{ id, char }`. The identity is
//! handed out once, by an [`IdAllocator`], and is the unit of cross-draft
//! correspondence: two drafts "share" a character when they reference the
//! same identity.
//!
//! Records live in a [`CharTable`] arena keyed by identity, so drafts only
//! carry identity sequences and never copy characters around.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Opaque, never-reused character identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CharId(u64);

impl CharId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CharId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CharId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CharId)
    }
}

/// Sequential identity generator for character records
///
/// Passed explicitly to every operation that creates characters. Loading a
/// persisted file replaces the allocator with one positioned past the
/// highest identity seen.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocator whose first identity is one past `max`
    pub fn after(max: Option<CharId>) -> Self {
        Self {
            next: max.map_or(1, |id| id.0 + 1),
        }
    }

    /// Generate next sequential identity
    pub fn next_id(&mut self) -> CharId {
        let id = CharId(self.next);
        self.next += 1;
        id
    }

    /// The identity the next call to [`next_id`](Self::next_id) returns
    pub fn peek(&self) -> CharId {
        CharId(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena of character records keyed by identity
#[derive(Debug, Clone, Default)]
pub struct CharTable {
    chars: HashMap<CharId, char>,
}

impl CharTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create fresh records for every code point of `text`
    pub fn allocate(&mut self, ids: &mut IdAllocator, text: &str) -> Vec<CharId> {
        text.chars()
            .map(|ch| {
                let id = ids.next_id();
                self.chars.insert(id, ch);
                id
            })
            .collect()
    }

    /// Register an existing record (used when loading).
    ///
    /// Fails with the already-registered character when `id` is bound to a
    /// different code point.
    pub fn register(&mut self, id: CharId, ch: char) -> Result<(), char> {
        match self.chars.get(&id) {
            Some(existing) if *existing != ch => Err(*existing),
            Some(_) => Ok(()),
            None => {
                self.chars.insert(id, ch);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: CharId) -> Option<char> {
        self.chars.get(&id).copied()
    }

    /// Character for `id`, or U+FFFD for an identity with no record
    pub fn char_of(&self, id: CharId) -> char {
        self.get(id).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    pub fn chars(&self, ids: &[CharId]) -> Vec<char> {
        ids.iter().map(|id| self.char_of(*id)).collect()
    }

    pub fn text(&self, ids: &[CharId]) -> String {
        ids.iter().map(|id| self.char_of(*id)).collect()
    }

    pub fn max_id(&self) -> Option<CharId> {
        self.chars.keys().max().copied()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut ids = IdAllocator::new();

        assert_eq!(ids.next_id(), CharId::new(1));
        assert_eq!(ids.next_id(), CharId::new(2));
        assert_eq!(ids.peek(), CharId::new(3));
    }

    #[test]
    fn test_allocator_after_max() {
        let mut ids = IdAllocator::after(Some(CharId::new(41)));
        assert_eq!(ids.next_id(), CharId::new(42));

        let mut fresh = IdAllocator::after(None);
        assert_eq!(fresh.next_id(), CharId::new(1));
    }

    #[test]
    fn test_allocate_text() {
        let mut ids = IdAllocator::new();
        let mut table = CharTable::new();

        let first = table.allocate(&mut ids, "héllo");
        let second = table.allocate(&mut ids, "héllo");

        assert_eq!(first.len(), 5);
        assert_eq!(table.text(&first), "héllo");
        // Same text, distinct provenance
        assert_ne!(first, second);
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn test_register_conflict() {
        let mut table = CharTable::new();

        assert!(table.register(CharId::new(7), 'a').is_ok());
        assert!(table.register(CharId::new(7), 'a').is_ok());
        assert_eq!(table.register(CharId::new(7), 'b'), Err('a'));
        assert_eq!(table.max_id(), Some(CharId::new(7)));
    }

    #[test]
    fn test_unknown_id_renders_replacement() {
        let table = CharTable::new();
        assert_eq!(table.char_of(CharId::new(3)), '\u{FFFD}');
    }

    #[test]
    fn test_parse_char_id() {
        assert_eq!(" 12 ".parse::<CharId>().unwrap(), CharId::new(12));
        assert!("x".parse::<CharId>().is_err());
    }
}
