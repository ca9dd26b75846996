use super::*;
use pretty_assertions::assert_eq;

#[test]
fn failure_substitutes_a_single_error_turn() {
    let mut state = state();
    let pending = submit_message(&mut state, "hello");

    run_runtime(
        &mut state,
        RuntimeEvent::TurnFailed {
            pending_turn: pending,
            message: "Failed to get a response from the assistant.".to_string(),
        },
    );

    assert_eq!(state.transcript.len(), 2);
    let turn = &state.transcript[1];
    assert_eq!(turn.id, pending);
    assert!(!turn.pending);
    assert_eq!(
        turn.text,
        "Error: Failed to get a response from the assistant."
    );
    assert!(turn.is_error());
    assert!(!state.busy);
}

#[test]
fn failure_preserves_profile_status_and_actions() {
    let mut state = state();
    let first = submit_message(&mut state, "register my deed");
    run_runtime(
        &mut state,
        RuntimeEvent::TurnResolved {
            pending_turn: first,
            reply: parsed_reply(
                "Noted.",
                Some(profile_with_status("YELLOW")),
                "- Upload the khatian",
            ),
        },
    );

    let second = submit_message(&mut state, "what next?");
    run_runtime(
        &mut state,
        RuntimeEvent::TurnFailed {
            pending_turn: second,
            message: "boom".to_string(),
        },
    );

    assert_eq!(state.status, DocumentStatus::Yellow);
    assert_eq!(state.actions, "- Upload the khatian");
    assert!(state.profile.is_some());
    // Sources were cleared when the failed submission started and stay gone.
    assert_eq!(state.sources, None);
}

#[test]
fn chat_recovers_after_a_failed_turn() {
    let mut state = state();
    let first = submit_message(&mut state, "hello");
    run_runtime(
        &mut state,
        RuntimeEvent::TurnFailed {
            pending_turn: first,
            message: "boom".to_string(),
        },
    );
    assert!(!state.busy);

    let second = submit_message(&mut state, "try again");
    run_runtime(
        &mut state,
        RuntimeEvent::TurnResolved {
            pending_turn: second,
            reply: parsed_reply("Back on track.", None, ""),
        },
    );

    assert_eq!(state.transcript.len(), 4);
    assert_eq!(state.transcript[3].text, "Back on track.");
    assert!(state.transcript[1].is_error());
}
