use std::path::PathBuf;

use super::parser::ParsedReply;
use super::state::AttachmentMeta;
use super::state::TurnId;

#[derive(Debug, Clone)]
pub enum ChatEvent {
    User(UserEvent),
    Runtime(RuntimeEvent),
}

#[derive(Debug, Clone)]
pub enum UserEvent {
    Input(char),
    Backspace,
    Paste(String),
    Attach { path: PathBuf },
    Detach,
    Submit,
    StartConversation,
    Scroll(i64),
    ScrollToBottom,
    Quit,
}

#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TurnResolved {
        pending_turn: TurnId,
        reply: ParsedReply,
    },
    TurnFailed {
        pending_turn: TurnId,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEffect {
    RequestFrame,
    DispatchRequest {
        pending_turn: TurnId,
        message: String,
        attachment: Option<AttachmentMeta>,
    },
    Quit,
}
