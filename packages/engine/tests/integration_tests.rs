//! End-to-end scenarios through the session command surface
//!
//! This tests:
//! - Replacement, insertion and sentence-addition propagation
//! - Explicit condition scoping
//! - Voting, scoring, hiding and sorting
//! - Undo/redo sequences
//! - Save/load round trips

use polydraft_engine::{
    CharId, ConditionPart, Draft, EditSession, EngineError, SessionOptions, Vote,
};
use std::collections::{BTreeSet, HashSet};

fn seeded(text: &str) -> EditSession {
    EditSession::seeded(text, SessionOptions::default()).unwrap()
}

fn texts(session: &EditSession) -> Vec<String> {
    session
        .drafts()
        .drafts()
        .map(|draft| session.text_of(draft))
        .collect()
}

fn draft_with_text(session: &EditSession, text: &str) -> Draft {
    session
        .drafts()
        .drafts()
        .find(|draft| session.text_of(draft) == text)
        .cloned()
        .unwrap_or_else(|| panic!("No draft with text {:?}", text))
}

fn select_text(session: &mut EditSession, text: &str) {
    let key = draft_with_text(session, text).key();
    session.select_draft(&key).unwrap();
}

fn assert_invariants(session: &EditSession) {
    let width = session.ledger().width();
    let mut keys = HashSet::new();
    for (draft, vector) in session.drafts().iter() {
        assert_eq!(vector.len(), width, "vector width for {:?}", draft);
        assert!(keys.insert(draft.key()), "duplicate key {}", draft.key());

        let expected = 1 + vector
            .suggestion_ids()
            .map(|id| session.suggestion(id).unwrap().score)
            .sum::<i64>();
        assert_eq!(session.ledger().draft_score(vector), expected);
    }
}

#[test]
fn test_replacement_scenario() {
    let mut session = seeded("The cat sat.");
    let root = session.selected().unwrap().clone();

    let outcome = session.apply_edit("The dog sat.", &[]).unwrap();
    assert_eq!(outcome.created, 1);
    assert_eq!(texts(&session), vec!["The cat sat.", "The dog sat."]);

    let suggestion = session.suggestion(outcome.suggestion_id).unwrap();
    let cat: BTreeSet<CharId> = root.ids()[4..7].iter().copied().collect();
    assert_eq!(suggestion.removed_ids, cat);
    assert_eq!(suggestion.new_ids.len(), 3);
    assert!(suggestion.new_ids.iter().all(|id| !root.ids().contains(id)));
    assert_eq!(suggestion.score, 1);
    assert_eq!(suggestion.selected, root);
    assert_eq!(session.text_of(&suggestion.resulting), "The dog sat.");

    let dog = draft_with_text(&session, "The dog sat.");
    assert_eq!(session.drafts().vector(&root).unwrap().to_string(), "[0]");
    assert_eq!(session.drafts().vector(&dog).unwrap().to_string(), "[1]");
    assert_invariants(&session);
}

#[test]
fn test_sentence_addition_scenario() {
    let mut session = seeded("A. B.");
    session.apply_edit("A. C.", &[]).unwrap();
    assert_eq!(texts(&session), vec!["A. B.", "A. C."]);

    select_text(&mut session, "A. B.");
    let outcome = session.apply_edit("A. X. B.", &[]).unwrap();

    assert_eq!(outcome.created, 2);
    let all = texts(&session);
    assert!(all.contains(&"A. X. B.".to_string()));
    assert!(all.contains(&"A. X. C.".to_string()));

    // The new sentence shares identities across both drafts
    let first = draft_with_text(&session, "A. X. B.");
    let second = draft_with_text(&session, "A. X. C.");
    assert_eq!(first.ids()[2..5], second.ids()[2..5]);
    assert_invariants(&session);
}

#[test]
fn test_identity_stability() {
    let mut session = seeded("Keep this. Change that.");
    let root = session.selected().unwrap().clone();

    session
        .apply_edit("Keep this. Change those.", &[])
        .unwrap();
    let child = draft_with_text(&session, "Keep this. Change those.");

    // "Keep this. Change th" is untouched
    assert_eq!(child.ids()[..20], root.ids()[..20]);
    assert_eq!(child.ids().last(), root.ids().last());
}

#[test]
fn test_explicit_condition_limits_propagation() {
    let mut session = seeded("The cat sat.");
    session.apply_edit("The cat sat down.", &[]).unwrap();

    select_text(&mut session, "The cat sat down.");
    let down: ConditionPart = session.condition_part(12, 16).unwrap();
    assert_eq!(down.text, "down");

    let outcome = session.apply_edit("The dog sat down.", &[down]).unwrap();
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.gated, 1);
    assert_eq!(
        texts(&session),
        vec!["The cat sat.", "The cat sat down.", "The dog sat down."]
    );

    let suggestion = session.suggestion(outcome.suggestion_id).unwrap();
    assert_eq!(suggestion.condition_ids.len(), 4);
}

#[test]
fn test_without_condition_edit_reaches_every_match() {
    let mut session = seeded("The cat sat.");
    session.apply_edit("The cat sat down.", &[]).unwrap();
    select_text(&mut session, "The cat sat down.");

    let outcome = session.apply_edit("The dog sat down.", &[]).unwrap();
    assert_eq!(outcome.created, 2);
    assert!(texts(&session).contains(&"The dog sat.".to_string()));
}

#[test]
fn test_vote_and_hide_bad_edits() {
    let mut session = seeded("The cat sat.");
    let outcome = session.apply_edit("The dog sat.", &[]).unwrap();

    assert_eq!(session.vote(outcome.suggestion_id, Vote::Down), Ok(0));
    assert!(session.toggle_hide_bad_edits());

    let visible: Vec<String> = session
        .visible_drafts()
        .into_iter()
        .map(|view| view.text)
        .collect();
    assert_eq!(visible, vec!["The cat sat."]);
    assert_eq!(session.drafts().len(), 2);

    assert!(matches!(
        session.vote(42, Vote::Up),
        Err(EngineError::UnknownSuggestion(42))
    ));
    assert_invariants(&session);
}

#[test]
fn test_sort_by_score() {
    let mut session = seeded("One two three.");
    let first = session.apply_edit("One two three four.", &[]).unwrap();
    select_text(&mut session, "One two three.");
    let second = session.apply_edit("One three.", &[]).unwrap();

    session.vote(second.suggestion_id, Vote::Up).unwrap();
    session.vote(second.suggestion_id, Vote::Up).unwrap();
    session.vote(first.suggestion_id, Vote::Down).unwrap();
    session.toggle_sort_by_score();

    let views = session.visible_drafts();
    let order: Vec<&str> = views.iter().map(|view| view.text.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "One three four.",
            "One three.",
            "One two three four.",
            "One two three."
        ]
    );
    assert_eq!(views[0].score, 1 + 0 + 3);
    assert_eq!(views[0].vector, "[1,1]");
    assert_invariants(&session);
}

#[test]
fn test_undo_redo_inverse() {
    let mut session = seeded("The cat sat.");
    let before = session.snapshot().clone();

    session.apply_edit("The dog sat.", &[]).unwrap();
    let after = session.snapshot().clone();

    assert!(session.undo());
    assert_eq!(session.snapshot(), &before);
    assert_eq!(session.selected_text().as_deref(), Some("The cat sat."));
    assert_invariants(&session);

    assert!(session.redo());
    assert_eq!(session.snapshot(), &after);
    assert_eq!(session.selected_text().as_deref(), Some("The cat sat."));
    assert_invariants(&session);

    assert!(!session.redo());
}

#[test]
fn test_new_edit_clears_redo() {
    let mut session = seeded("The cat sat.");
    session.apply_edit("The dog sat.", &[]).unwrap();
    assert!(session.undo());
    assert!(session.can_redo());

    session.apply_edit("The cow sat.", &[]).unwrap();
    assert!(!session.can_redo());
    assert_eq!(session.ledger().len(), 1);
    assert_eq!(texts(&session), vec!["The cat sat.", "The cow sat."]);
}

#[test]
fn test_multiple_undo_levels() {
    let mut session = seeded("v0 text.");
    session.apply_edit("v1 text.", &[]).unwrap();
    session.apply_edit("v2 text.", &[]).unwrap();
    session.apply_edit("v3 text.", &[]).unwrap();

    assert_eq!(session.undo_levels(), 3);
    while session.undo() {}
    assert_eq!(texts(&session), vec!["v0 text."]);
    assert_eq!(session.redo_levels(), 3);

    while session.redo() {}
    assert_eq!(session.ledger().len(), 3);
    assert_invariants(&session);
}

#[test]
fn test_degenerate_edit_still_records_suggestion() {
    let mut session = seeded("Hi.");
    let outcome = session.apply_edit("   ", &[]).unwrap();

    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.degenerate, 1);
    assert_eq!(session.drafts().len(), 1);
    assert_eq!(session.ledger().len(), 1);
    assert_invariants(&session);
}

#[test]
fn test_save_load_round_trip() {
    let mut session = seeded("Line one.\nIt's a \"quote\" \\ here.");
    session
        .apply_edit("Line one.\nIt's a \"quote\" \\ there.", &[])
        .unwrap();
    select_text(&mut session, "Line one.\nIt's a \"quote\" \\ here.");
    session
        .apply_edit("Line one. Line two.\nIt's a \"quote\" \\ here.", &[])
        .unwrap();
    session.vote(1, Vote::Up).unwrap();

    let bytes = session.save();
    let mut restored = EditSession::new();
    restored.load(&bytes).unwrap();

    assert_eq!(restored.snapshot(), session.snapshot());
    assert_eq!(texts(&restored), texts(&session));
    assert_eq!(restored.save(), bytes);
    assert_eq!(restored.lineage().len(), restored.drafts().len());
    assert!(!restored.can_undo());
    assert_invariants(&restored);
}

#[test]
fn test_load_advances_identity_counter() {
    let mut session = seeded("Alpha beta.");
    session.apply_edit("Alpha gamma.", &[]).unwrap();
    let bytes = session.save();

    let mut restored = EditSession::new();
    restored.load(&bytes).unwrap();
    let max_seen = restored
        .drafts()
        .drafts()
        .flat_map(|draft| draft.ids().iter().copied())
        .max()
        .unwrap();

    let outcome = restored.apply_edit("Alpha beta delta.", &[]).unwrap();
    let suggestion = restored.suggestion(outcome.suggestion_id).unwrap();
    assert!(suggestion.new_ids.iter().all(|id| *id > max_seen));
}

#[test]
fn test_graph_follows_visible_drafts() {
    let mut session = seeded("The cat sat.");
    let outcome = session.apply_edit("The dog sat.", &[]).unwrap();
    session.apply_edit("The dog sat up.", &[]).unwrap();

    let graph = session.graph();
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(
        graph.edges,
        vec![
            ("The cat sat.".to_string(), "The dog sat.".to_string()),
            ("The dog sat.".to_string(), "The dog sat up.".to_string()),
        ]
    );

    session.vote(outcome.suggestion_id, Vote::Down).unwrap();
    session.toggle_hide_bad_edits();
    let graph = session.graph();
    assert_eq!(graph.nodes, vec!["The cat sat."]);
    assert!(graph.edges.is_empty());
}

#[test]
fn test_paragraph_insertion_reaches_sibling() {
    let mut session = seeded("Intro.\nthe cat sat");
    session.apply_edit("Hello.\nthe cat sat", &[]).unwrap();

    select_text(&mut session, "Intro.\nthe cat sat");
    let outcome = session.apply_edit("Intro.\nthe big cat sat", &[]).unwrap();

    assert_eq!(outcome.created, 2);
    assert_eq!(
        texts(&session),
        vec![
            "Intro.\nthe cat sat",
            "Hello.\nthe cat sat",
            "Intro.\nthe big cat sat",
            "Hello.\nthe big cat sat"
        ]
    );
    assert_invariants(&session);
}

#[test]
fn test_sentence_addition_respects_explicit_condition() {
    let mut session = seeded("A. B.");
    session.apply_edit("A. C.", &[]).unwrap();

    select_text(&mut session, "A. B.");
    let b = session.condition_part(3, 5).unwrap();
    assert_eq!(b.text, "B.");

    let outcome = session.apply_edit("A. X. B.", &[b]).unwrap();
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.gated, 1);
    assert_eq!(texts(&session), vec!["A. B.", "A. C.", "A. X. B."]);

    let suggestion = session.suggestion(outcome.suggestion_id).unwrap();
    assert_eq!(suggestion.condition_ids.len(), 2);
    assert_invariants(&session);
}

#[test]
fn test_undo_reverts_votes_cast_after_the_edit() {
    let mut session = seeded("The cat sat.");
    session.apply_edit("The dog sat.", &[]).unwrap();
    session.apply_edit("The dog sat up.", &[]).unwrap();
    assert_eq!(session.vote(1, Vote::Up), Ok(2));

    assert!(session.undo());
    assert_eq!(session.suggestion(1).unwrap().score, 1);
    assert!(session.suggestion(2).is_none());

    assert!(session.redo());
    assert_eq!(session.suggestion(1).unwrap().score, 2);
    assert_invariants(&session);
}

#[test]
fn test_resulting_draft_falls_back_when_selection_is_gated() {
    let mut session = seeded("The cat sat.");
    session.apply_edit("The cat sat down.", &[]).unwrap();
    let down = session.condition_part(12, 16).unwrap();

    // The condition comes from a sibling the selected draft lacks
    select_text(&mut session, "The cat sat.");
    let root = session.selected().unwrap().clone();
    let outcome = session.apply_edit("The dog sat.", &[down]).unwrap();

    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.gated, 1);
    assert!(texts(&session).contains(&"The dog sat down.".to_string()));
    assert!(!texts(&session).contains(&"The dog sat.".to_string()));

    let suggestion = session.suggestion(outcome.suggestion_id).unwrap();
    assert_eq!(suggestion.resulting, root);
    assert_eq!(session.selected(), Some(&root));
}

#[test]
fn test_load_rebuilds_lineage() {
    let mut session = seeded("A. B.");
    session.apply_edit("A. C.", &[]).unwrap();
    select_text(&mut session, "A. B.");
    session.apply_edit("A. X. B.", &[]).unwrap();
    let before = session.graph();

    let mut restored = EditSession::new();
    restored.load(&session.save()).unwrap();

    assert_eq!(restored.graph(), before);
    assert_eq!(
        restored.graph().edges,
        vec![
            ("A. B.".to_string(), "A. C.".to_string()),
            ("A. B.".to_string(), "A. X. B.".to_string()),
            ("A. C.".to_string(), "A. X. C.".to_string()),
        ]
    );
}
