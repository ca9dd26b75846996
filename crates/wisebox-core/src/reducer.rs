use std::path::PathBuf;

use super::events::ChatEffect;
use super::events::ChatEvent;
use super::events::RuntimeEvent;
use super::events::UserEvent;
use super::state::AttachmentMeta;
use super::state::ChatState;
use super::state::ConversationTurn;

/// The fixed bootstrap request sent through the normal pipeline on startup.
pub const GREETING_REQUEST: &str =
    "Hello, please provide a greeting to start the conversation.";

const HELP_NOTICE: &str =
    "Commands: /attach <path> | /detach | /status | /help | /quit";

pub fn reduce(state: &mut ChatState, event: ChatEvent) -> Vec<ChatEffect> {
    match event {
        ChatEvent::User(user) => reduce_user(state, user),
        ChatEvent::Runtime(runtime) => {
            reduce_runtime(state, runtime);
            Vec::new()
        }
    }
}

fn reduce_user(state: &mut ChatState, event: UserEvent) -> Vec<ChatEffect> {
    match event {
        UserEvent::Input(ch) => {
            state.interaction.input.push(ch);
            state.interaction.notice = None;
            vec![ChatEffect::RequestFrame]
        }
        UserEvent::Backspace => {
            state.interaction.input.pop();
            vec![ChatEffect::RequestFrame]
        }
        UserEvent::Paste(text) => {
            state.interaction.input.push_str(&text);
            state.interaction.notice = None;
            vec![ChatEffect::RequestFrame]
        }
        UserEvent::Attach { path } => {
            attach(state, &path);
            vec![ChatEffect::RequestFrame]
        }
        UserEvent::Detach => {
            detach(state);
            vec![ChatEffect::RequestFrame]
        }
        UserEvent::Submit => submit(state),
        UserEvent::StartConversation => start_conversation(state),
        UserEvent::Scroll(delta) => {
            state.interaction.stick_to_bottom = false;
            state.interaction.scroll =
                state.interaction.scroll.saturating_add_signed(delta as isize);
            vec![ChatEffect::RequestFrame]
        }
        UserEvent::ScrollToBottom => {
            state.interaction.stick_to_bottom = true;
            vec![ChatEffect::RequestFrame]
        }
        UserEvent::Quit => vec![ChatEffect::Quit],
    }
}

/// Bootstrap: one pending assistant turn, no user turn, same pipeline as a
/// normal submission from here on.
fn start_conversation(state: &mut ChatState) -> Vec<ChatEffect> {
    if state.busy {
        return Vec::new();
    }
    let pending_id = state.allocate_turn_id();
    state
        .transcript
        .push(ConversationTurn::pending_assistant(pending_id));
    state.sources = None;
    state.busy = true;
    state.interaction.stick_to_bottom = true;
    vec![
        ChatEffect::DispatchRequest {
            pending_turn: pending_id,
            message: GREETING_REQUEST.to_string(),
            attachment: None,
        },
        ChatEffect::RequestFrame,
    ]
}

fn submit(state: &mut ChatState) -> Vec<ChatEffect> {
    // Submission is rejected outright while a turn is in flight; the input
    // buffer is left untouched.
    if state.busy {
        return Vec::new();
    }

    let trimmed = state.interaction.input.trim().to_string();
    if trimmed.starts_with('/') {
        state.interaction.input.clear();
        return handle_command(state, &trimmed);
    }
    if trimmed.is_empty() && state.interaction.attachment.is_none() {
        return Vec::new();
    }

    state.interaction.input.clear();
    state.interaction.notice = None;
    let attachment = state.interaction.attachment.take();

    let user_id = state.allocate_turn_id();
    let pending_id = state.allocate_turn_id();
    state.transcript.push(ConversationTurn::user(
        user_id,
        trimmed.clone(),
        attachment.clone(),
    ));
    state
        .transcript
        .push(ConversationTurn::pending_assistant(pending_id));

    // Sources go stale the instant a new request starts, before any
    // response arrives, and stay cleared even if the turn later fails.
    state.sources = None;
    state.busy = true;
    state.interaction.stick_to_bottom = true;

    vec![
        ChatEffect::DispatchRequest {
            pending_turn: pending_id,
            message: trimmed,
            attachment,
        },
        ChatEffect::RequestFrame,
    ]
}

fn handle_command(state: &mut ChatState, input: &str) -> Vec<ChatEffect> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument_tail = input
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");

    match command {
        "/attach" => {
            if argument_tail.is_empty() {
                state.interaction.notice = Some("Usage: /attach <path>".to_string());
            } else {
                attach(state, &PathBuf::from(argument_tail));
            }
        }
        "/detach" => detach(state),
        "/status" => {
            let fields = state
                .profile
                .as_ref()
                .map(|profile| profile.field_count())
                .unwrap_or(0);
            state.interaction.notice = Some(format!(
                "Status: {} | profile fields: {} | turns: {}",
                state.status.label(),
                fields,
                state.transcript.len(),
            ));
        }
        "/help" => {
            state.interaction.notice = Some(HELP_NOTICE.to_string());
        }
        "/quit" => return vec![ChatEffect::Quit],
        other => {
            state.interaction.notice = Some(format!("Unknown command '{other}'. {HELP_NOTICE}"));
        }
    }
    vec![ChatEffect::RequestFrame]
}

fn attach(state: &mut ChatState, path: &std::path::Path) {
    let meta = AttachmentMeta::from_path(path);
    state.interaction.notice = Some(format!("Attached {} ({})", meta.name, meta.mime_type));
    state.interaction.attachment = Some(meta);
}

fn detach(state: &mut ChatState) {
    match state.interaction.attachment.take() {
        Some(meta) => {
            state.interaction.notice = Some(format!("Removed {}", meta.name));
        }
        None => {
            state.interaction.notice = Some("No attachment to remove".to_string());
        }
    }
}

fn reduce_runtime(state: &mut ChatState, event: RuntimeEvent) {
    match event {
        RuntimeEvent::TurnResolved {
            pending_turn,
            reply,
        } => {
            let Some(turn) = state.find_pending_mut(pending_turn) else {
                tracing::debug!(id = pending_turn.0, "ignoring resolution for unknown turn");
                return;
            };
            turn.text = reply.natural_reply;
            turn.pending = false;

            // The four side channels commit together, as one unit, from this
            // turn's parse result. The profile is replaced, never merged.
            state.profile = reply.profile;
            state.status = reply.status;
            state.actions = reply.actions;
            state.sources = reply.sources;
            state.busy = false;
        }
        RuntimeEvent::TurnFailed {
            pending_turn,
            message,
        } => {
            let Some(turn) = state.find_pending_mut(pending_turn) else {
                tracing::debug!(id = pending_turn.0, "ignoring failure for unknown turn");
                return;
            };
            turn.text = format!("Error: {message}");
            turn.pending = false;

            // Profile, status and actions keep their pre-call values; only
            // the sources clear from submission time remains in effect.
            state.busy = false;
        }
    }
}

#[cfg(test)]
mod tests;
