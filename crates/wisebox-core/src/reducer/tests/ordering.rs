use super::*;
use pretty_assertions::assert_eq;

/// Puts two request/placeholder pairs in flight at once. The UI's busy gate
/// normally prevents this, so the gate is lifted by hand between submissions
/// the way an external driver could.
fn two_in_flight(state: &mut ChatState) -> (TurnId, TurnId) {
    let first = submit_message(state, "first question");
    state.busy = false;
    let second = submit_message(state, "second question");
    (first, second)
}

#[test]
fn resolutions_commit_in_arrival_order() {
    let mut state = state();
    let (first, second) = two_in_flight(&mut state);
    assert_eq!(state.pending_turn_count(), 2);

    run_runtime(
        &mut state,
        RuntimeEvent::TurnResolved {
            pending_turn: second,
            reply: parsed_reply(
                "Second answer.",
                Some(profile_with_status("GREEN")),
                "- From the second turn",
            ),
        },
    );
    assert_eq!(state.status, DocumentStatus::Green);

    run_runtime(
        &mut state,
        RuntimeEvent::TurnResolved {
            pending_turn: first,
            reply: parsed_reply(
                "First answer.",
                Some(profile_with_status("RED")),
                "- From the first turn",
            ),
        },
    );

    // The later arrival wins the side channels, whichever turn it belongs to.
    assert_eq!(state.status, DocumentStatus::Red);
    assert_eq!(state.actions, "- From the first turn");
    assert_eq!(state.pending_turn_count(), 0);
}

#[test]
fn each_resolution_lands_in_its_own_placeholder() {
    let mut state = state();
    let (first, second) = two_in_flight(&mut state);

    run_runtime(
        &mut state,
        RuntimeEvent::TurnResolved {
            pending_turn: second,
            reply: parsed_reply("Second answer.", None, ""),
        },
    );
    run_runtime(
        &mut state,
        RuntimeEvent::TurnResolved {
            pending_turn: first,
            reply: parsed_reply("First answer.", None, ""),
        },
    );

    assert_eq!(state.transcript.len(), 4);
    assert_eq!(state.transcript[1].id, first);
    assert_eq!(state.transcript[1].text, "First answer.");
    assert_eq!(state.transcript[3].id, second);
    assert_eq!(state.transcript[3].text, "Second answer.");
}

#[test]
fn a_failure_for_one_turn_leaves_the_other_pending() {
    let mut state = state();
    let (first, second) = two_in_flight(&mut state);

    run_runtime(
        &mut state,
        RuntimeEvent::TurnFailed {
            pending_turn: first,
            message: "boom".to_string(),
        },
    );

    assert!(state.transcript[1].is_error());
    assert_eq!(state.pending_turn_count(), 1);
    assert_eq!(
        state.transcript.iter().find(|t| t.pending).map(|t| t.id),
        Some(second)
    );
}
