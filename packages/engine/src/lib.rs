//! # Polydraft Engine
//!
//! Keeps many simultaneously evolving drafts of one text and applies a
//! single edit to all of them consistently.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ diff: (old text, new text) → one splice     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ scope: splice → anchored operation + gate   │
//! │  - removed segment / sentence / paragraph   │
//! │  - preceding context for new sentences      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ propagate: operation × draft set → new set  │
//! │  - condition gate, content guard, dedup     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: ledger, vectors, lineage, history  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Identity, not text**: characters are compared by identity, so an
//!    edit only reaches drafts that share the edited characters
//! 2. **Drafts are immutable**: an edit adds drafts, it never rewrites one
//! 3. **Whole-state snapshots**: drafts, vectors and suggestions are undone
//!    together
//!
//! ## Usage
//!
//! ```rust
//! use polydraft_engine::{EditSession, SessionOptions, Vote};
//!
//! let mut session = EditSession::seeded("The cat sat.", SessionOptions::default()).unwrap();
//! let outcome = session.apply_edit("The dog sat.", &[]).unwrap();
//! assert_eq!(outcome.created, 1);
//!
//! session.vote(outcome.suggestion_id, Vote::Up).unwrap();
//! assert!(session.undo());
//! assert_eq!(session.drafts().len(), 1);
//! ```

mod diff;
mod draft;
mod errors;
mod history;
mod identity;
mod ledger;
mod lineage;
mod propagate;
mod scope;
mod serializer;
mod session;

pub use diff::TextDiff;
pub use draft::{find_segment, Draft, DraftSet};
pub use errors::{EngineError, EngineResult, ParseError};
pub use history::{History, Snapshot};
pub use identity::{CharId, CharTable, IdAllocator};
pub use ledger::{rank, ContributionVector, Ledger, Suggestion, Vote};
pub use lineage::{Lineage, LineageEdge};
pub use propagate::{is_content_empty, propagate, sentence_insertion_point, Propagation};
pub use scope::{
    insertion_spec, is_sentence_addition, is_terminator, plan_edit, AnchorSpec, ConditionPart,
    EditPlan, Operation, SENTENCE_TERMINATORS,
};
pub use serializer::{decode_chars, deserialize, encode_chars, serialize, Decoded};
pub use session::{
    DraftView, EditOutcome, EditSession, GraphView, SessionOptions, SuggestionView,
};
