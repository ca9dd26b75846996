use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "WiseBox",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TurnId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub name: String,
    pub mime_type: String,
    pub path: PathBuf,
}

impl AttachmentMeta {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("attachment")
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            mime_type,
            path: path.to_path_buf(),
        }
    }
}

/// One exchange unit in the visible transcript. Pending turns are
/// placeholders awaiting a response; they are replaced in place when the
/// response resolves and are never mutated after finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub role: Role,
    pub text: String,
    pub pending: bool,
    pub attachment: Option<AttachmentMeta>,
    pub created_at_ms: u64,
}

impl ConversationTurn {
    pub fn user(id: TurnId, text: String, attachment: Option<AttachmentMeta>) -> Self {
        Self {
            id,
            role: Role::User,
            text,
            pending: false,
            attachment,
            created_at_ms: now_ms(),
        }
    }

    pub fn pending_assistant(id: TurnId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            text: String::new(),
            pending: true,
            attachment: None,
            created_at_ms: now_ms(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.role == Role::Assistant && self.text.starts_with("Error: ")
    }
}

pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Traffic-light summary of document completeness, derived purely from the
/// profile's `document_status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStatus {
    Red,
    Yellow,
    Green,
    #[default]
    Unknown,
}

impl DocumentStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn banner(self) -> &'static str {
        match self {
            Self::Red => "Action Required: Mandatory documents are missing.",
            Self::Yellow => "In Progress: Mandatory documents uploaded, optional pending.",
            Self::Green => "Complete: All documents are uploaded and accounted for.",
            Self::Unknown => "Welcome! Let's get started on your property profile.",
        }
    }

    pub fn from_profile(profile: Option<&PropertyProfile>) -> Self {
        let Some(status) = profile.and_then(PropertyProfile::document_status) else {
            return Self::Unknown;
        };
        match status.to_uppercase().as_str() {
            "RED" => Self::Red,
            "YELLOW" => Self::Yellow,
            "GREEN" => Self::Green,
            _ => Self::Unknown,
        }
    }
}

/// Open-ended structured record of everything learned about the property.
/// The assistant re-emits the full cumulative profile each turn, so it is
/// replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyProfile(pub serde_json::Map<String, serde_json::Value>);

impl PropertyProfile {
    pub fn document_status(&self) -> Option<&str> {
        self.0.get("document_status").and_then(|value| value.as_str())
    }

    pub fn field_count(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatInteraction {
    pub input: String,
    pub attachment: Option<AttachmentMeta>,
    pub notice: Option<String>,
    pub scroll: usize,
    pub stick_to_bottom: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub transcript: Vec<ConversationTurn>,
    pub profile: Option<PropertyProfile>,
    pub status: DocumentStatus,
    pub actions: String,
    pub sources: Option<Vec<GroundingSource>>,
    pub busy: bool,
    pub interaction: ChatInteraction,
    next_turn_id: u64,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            profile: None,
            status: DocumentStatus::Unknown,
            actions: String::new(),
            sources: None,
            busy: false,
            interaction: ChatInteraction {
                stick_to_bottom: true,
                ..ChatInteraction::default()
            },
            next_turn_id: 1,
        }
    }

    pub fn allocate_turn_id(&mut self) -> TurnId {
        let id = TurnId(self.next_turn_id);
        self.next_turn_id += 1;
        id
    }

    pub fn pending_turn_count(&self) -> usize {
        self.transcript.iter().filter(|turn| turn.pending).count()
    }

    pub fn find_pending_mut(&mut self, id: TurnId) -> Option<&mut ConversationTurn> {
        self.transcript
            .iter_mut()
            .find(|turn| turn.id == id && turn.pending)
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
