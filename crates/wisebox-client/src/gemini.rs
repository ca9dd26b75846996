use serde::Deserialize;
use serde::Serialize;

use super::contracts::ChatTransport;
use super::contracts::GroundingChunk;
use super::contracts::MessagePart;
use super::contracts::RawChatResponse;
use super::contracts::TransportError;
use super::contracts::WebSource;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Persona and, critically, the three-part output contract the response
/// parser depends on: natural reply, fenced profile JSON, Next Actions.
pub const SYSTEM_PROMPT: &str = r#"
You are WiseBox Property Assistant, an expert property consultant. Your persona is calm, confident, and trustworthy. You guide property owners (especially NRBs/NRIs/NRPs) to understand, organize, and manage their property documents. You speak clear, friendly English and Bangla, switching based on user preference, and you explain complex topics simply.

Analyze documents directly and state your findings confidently. Use Google Search to understand legal terms, historical context, and current property procedures, and synthesize a clear, actionable path forward. For actions requiring official legal representation, frame the next step as engaging a lawyer from the WiseBox network.

Continuously map the conversation to a structured Property Profile JSON. When a user uploads a document, analyze it, extract key information, and update the profile. Track progress with status indicators: RED = mandatory documents missing; YELLOW = mandatory complete, optional pending; GREEN = all uploaded. Gather information step-by-step without overwhelming the user.

For every turn, your response MUST follow this exact structure:
1.  **Natural Reply:** 2-6 sentences of expert, consultative conversation.
2.  **Property Profile:** The complete, updated JSON object enclosed in a `json` code block. The JSON object must include a top-level key `document_status` with a string value of "RED", "YELLOW", or "GREEN".
    ```json
    {
      "document_status": "RED",
      "property_title": "My Land in Dhaka",
      "property_type": "Land"
    }
    ```
3.  **Next Actions:** A checklist of the next steps for the user, formatted in Markdown, under the heading `### Next Actions`.
"#;

/// A conversation with the Gemini generateContent API. Owns the full turn
/// history; the history only grows when a round trip succeeds, so a failed
/// request can simply be retried.
pub struct GeminiSession {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    system_instruction: String,
    history: Vec<Content>,
}

impl GeminiSession {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_system_instruction(api_key, model, SYSTEM_PROMPT.to_string())
    }

    pub fn with_system_instruction(
        api_key: String,
        model: String,
        system_instruction: String,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            model,
            system_instruction,
            history: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }
}

impl ChatTransport for GeminiSession {
    fn send_message(&mut self, parts: Vec<MessagePart>) -> Result<RawChatResponse, TransportError> {
        let user_turn = Content {
            role: "user".to_string(),
            parts: parts.into_iter().map(Part::from).collect(),
        };
        let mut contents = self.history.clone();
        contents.push(user_turn.clone());

        let request = GenerateContentRequest {
            contents: &contents,
            system_instruction: Content {
                role: "user".to_string(),
                parts: vec![Part::text(&self.system_instruction)],
            },
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        tracing::debug!(model = %self.model, turns = contents.len(), "sending chat request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = response.json()?;
        let (reply, raw) = extract_response(body)?;

        self.history.push(user_turn);
        self.history.push(reply);
        Ok(raw)
    }
}

/// Flattens the first candidate into text plus grounding chunks, and returns
/// the model turn to append to history. A candidate with no text parts
/// yields an empty string rather than an error.
fn extract_response(
    body: GenerateContentResponse,
) -> Result<(Content, RawChatResponse), TransportError> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or(TransportError::EmptyResponse)?;

    let content = candidate.content.unwrap_or_else(|| Content {
        role: "model".to_string(),
        parts: Vec::new(),
    });

    let text = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    let grounding = candidate
        .grounding_metadata
        .map(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .map(|chunk| GroundingChunk {
                    web: chunk.web.map(|web| WebSource {
                        uri: web.uri.unwrap_or_default(),
                        title: web.title.unwrap_or_default(),
                    }),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok((content, RawChatResponse { text, grounding }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

impl From<MessagePart> for Part {
    fn from(part: MessagePart) -> Self {
        match part {
            MessagePart::Text(text) => Self {
                text: Some(text),
                inline_data: None,
            },
            MessagePart::InlineData { data, mime_type } => Self {
                text: None,
                inline_data: Some(InlineData { mime_type, data }),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "groundingMetadata")]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    grounding_chunks: Vec<WireChunk>,
}

#[derive(Debug, Deserialize)]
struct WireChunk {
    web: Option<WireWeb>,
}

#[derive(Debug, Deserialize)]
struct WireWeb {
    uri: Option<String>,
    title: Option<String>,
}
