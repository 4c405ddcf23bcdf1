//! Error types for the engine

use crate::identity::CharId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Initial draft is blank")]
    InputEmpty,

    #[error("No draft selected")]
    NoSelection,

    #[error("Edit does not change the selected draft")]
    NoChange,

    #[error("Draft not found: {0}")]
    UnknownDraft(String),

    #[error("Suggestion not found: {0}")]
    UnknownSuggestion(u32),

    #[error("Range {start}..{end} is outside the selected draft (length {len})")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Failure to decode a persisted session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line of the persisted text (0 when no line applies)
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    pub fn conflicting_identity(line: usize, id: CharId, existing: char, found: char) -> Self {
        Self::new(
            line,
            format!("identity {id} bound to both {existing:?} and {found:?}"),
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
