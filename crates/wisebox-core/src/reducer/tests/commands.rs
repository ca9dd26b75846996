use super::*;
use pretty_assertions::assert_eq;

#[test]
fn quit_command_emits_quit_effect() {
    let mut state = state();
    type_input(&mut state, "/quit");
    let effects = reduce(&mut state, ChatEvent::User(UserEvent::Submit));

    assert_eq!(effects, vec![ChatEffect::Quit]);
    assert!(state.transcript.is_empty());
}

#[test]
fn attach_command_sets_pending_attachment() {
    let mut state = state();
    type_input(&mut state, "/attach /tmp/mouja.pdf");
    reduce(&mut state, ChatEvent::User(UserEvent::Submit));

    let attachment = state
        .interaction
        .attachment
        .as_ref()
        .expect("attachment set");
    assert_eq!(attachment.name, "mouja.pdf");
    assert_eq!(attachment.mime_type, "application/pdf");
    assert!(state.interaction.input.is_empty());
    assert!(state.transcript.is_empty());
}

#[test]
fn attach_command_takes_the_whole_tail_as_path() {
    let mut state = state();
    type_input(&mut state, "/attach /tmp/survey map.png");
    reduce(&mut state, ChatEvent::User(UserEvent::Submit));

    let attachment = state
        .interaction
        .attachment
        .as_ref()
        .expect("attachment set");
    // Spaces in the path are not argument separators.
    assert_eq!(attachment.name, "survey map.png");
    assert_eq!(attachment.mime_type, "image/png");
}

#[test]
fn attach_command_without_path_reports_usage() {
    let mut state = state();
    type_input(&mut state, "/attach");
    reduce(&mut state, ChatEvent::User(UserEvent::Submit));

    assert_eq!(
        state.interaction.notice.as_deref(),
        Some("Usage: /attach <path>")
    );
}

#[test]
fn detach_without_attachment_reports_nothing_to_remove() {
    let mut state = state();
    type_input(&mut state, "/detach");
    reduce(&mut state, ChatEvent::User(UserEvent::Submit));

    assert_eq!(
        state.interaction.notice.as_deref(),
        Some("No attachment to remove")
    );
}

#[test]
fn status_command_summarizes_conversation() {
    let mut state = state();
    let pending = submit_message(&mut state, "hello");
    run_runtime(
        &mut state,
        RuntimeEvent::TurnResolved {
            pending_turn: pending,
            reply: parsed_reply("Hi.", Some(profile_with_status("GREEN")), ""),
        },
    );

    type_input(&mut state, "/status");
    reduce(&mut state, ChatEvent::User(UserEvent::Submit));

    assert_eq!(
        state.interaction.notice.as_deref(),
        Some("Status: GREEN | profile fields: 1 | turns: 2")
    );
}

#[test]
fn unknown_command_is_reported() {
    let mut state = state();
    type_input(&mut state, "/frobnicate");
    reduce(&mut state, ChatEvent::User(UserEvent::Submit));

    let notice = state.interaction.notice.as_deref().unwrap_or_default();
    assert!(notice.starts_with("Unknown command '/frobnicate'"));
}
