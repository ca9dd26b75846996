pub(super) use super::reduce;
pub(super) use super::GREETING_REQUEST;
pub(super) use crate::events::ChatEffect;
pub(super) use crate::events::ChatEvent;
pub(super) use crate::events::RuntimeEvent;
pub(super) use crate::events::UserEvent;
pub(super) use crate::parser::ParsedReply;
pub(super) use crate::state::ChatState;
pub(super) use crate::state::DocumentStatus;
pub(super) use crate::state::GroundingSource;
pub(super) use crate::state::PropertyProfile;
pub(super) use crate::state::Role;
pub(super) use crate::state::TurnId;

mod commands;
mod failures;
mod ordering;

fn state() -> ChatState {
    ChatState::new()
}

fn type_input(state: &mut ChatState, text: &str) {
    for ch in text.chars() {
        reduce(state, ChatEvent::User(UserEvent::Input(ch)));
    }
}

/// Types `text` and submits it, returning the pending assistant turn id the
/// reducer asked the host to dispatch for.
fn submit_message(state: &mut ChatState, text: &str) -> TurnId {
    type_input(state, text);
    let effects = reduce(state, ChatEvent::User(UserEvent::Submit));
    dispatched_pending(&effects).expect("submit should dispatch a request")
}

fn dispatched_pending(effects: &[ChatEffect]) -> Option<TurnId> {
    effects.iter().find_map(|effect| match effect {
        ChatEffect::DispatchRequest { pending_turn, .. } => Some(*pending_turn),
        _ => None,
    })
}

fn run_runtime(state: &mut ChatState, event: RuntimeEvent) {
    let effects = reduce(state, ChatEvent::Runtime(event));
    assert!(effects.is_empty());
}

fn profile_with_status(status: &str) -> PropertyProfile {
    let mut map = serde_json::Map::new();
    map.insert(
        "document_status".to_string(),
        serde_json::Value::String(status.to_string()),
    );
    PropertyProfile(map)
}

fn parsed_reply(natural: &str, profile: Option<PropertyProfile>, actions: &str) -> ParsedReply {
    let status = DocumentStatus::from_profile(profile.as_ref());
    ParsedReply {
        natural_reply: natural.to_string(),
        profile,
        status,
        actions: actions.to_string(),
        sources: None,
    }
}

fn source(uri: &str, title: &str) -> GroundingSource {
    GroundingSource {
        uri: uri.to_string(),
        title: title.to_string(),
    }
}
