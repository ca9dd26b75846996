use serde::Deserialize;
use serde::Serialize;

/// One piece of a multimodal user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Text(String),
    InlineData { data: String, mime_type: String },
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// The transport's view of a model reply, before any protocol parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawChatResponse {
    pub text: String,
    pub grounding: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("response contained no candidates")]
    EmptyResponse,
}

/// A stateful conversation backend. Implementations own their own history;
/// callers hand over the parts for one turn and get the raw reply back.
pub trait ChatTransport {
    fn send_message(&mut self, parts: Vec<MessagePart>) -> Result<RawChatResponse, TransportError>;
}
