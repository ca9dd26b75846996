use super::state::DocumentStatus;
use super::state::GroundingSource;
use super::state::PropertyProfile;

pub const FALLBACK_REPLY: &str = "I'm sorry, I encountered an issue. Please try again.";

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "\n```";
const ACTIONS_HEADING: &str = "### Next Actions";

/// One grounding entry as surfaced by the transport; only entries with a
/// `web` citation are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingChunk {
    pub web: Option<GroundingSource>,
}

/// The three logical channels of one assistant reply, plus the derived
/// status and the filtered citations.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub natural_reply: String,
    pub profile: Option<PropertyProfile>,
    pub status: DocumentStatus,
    pub actions: String,
    pub sources: Option<Vec<GroundingSource>>,
}

struct FenceSplit<'a> {
    before: &'a str,
    inner: &'a str,
    after: &'a str,
}

/// Two-token scan for the first fenced JSON block. The first fence is
/// authoritative; an unterminated fence counts as no fence at all.
fn split_first_fence(text: &str) -> Option<FenceSplit<'_>> {
    let open = text.find(FENCE_OPEN)?;
    let inner_start = open + FENCE_OPEN.len();
    let close = text[inner_start..].find(FENCE_CLOSE)?;
    let inner_end = inner_start + close;
    let after_start = inner_end + FENCE_CLOSE.len();
    Some(FenceSplit {
        before: &text[..open],
        inner: &text[inner_start..inner_end],
        after: &text[after_start..],
    })
}

fn parse_profile(json_string: &str) -> Option<PropertyProfile> {
    match serde_json::from_str::<serde_json::Value>(json_string) {
        Ok(serde_json::Value::Object(map)) => Some(PropertyProfile(map)),
        Ok(other) => {
            tracing::warn!(kind = %value_kind(&other), "profile block is not a JSON object");
            None
        }
        Err(err) => {
            tracing::warn!(%err, "failed to parse profile JSON from response");
            None
        }
    }
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn strip_actions_heading(segment: &str) -> String {
    match segment.find(ACTIONS_HEADING) {
        Some(idx) => {
            let mut stripped = String::with_capacity(segment.len() - ACTIONS_HEADING.len());
            stripped.push_str(&segment[..idx]);
            stripped.push_str(&segment[idx + ACTIONS_HEADING.len()..]);
            stripped.trim().to_string()
        }
        None => segment.trim().to_string(),
    }
}

/// Decompose one raw assistant reply into its channels. Best-effort and
/// total: malformed structure degrades to defaults, never to an error.
pub fn parse_reply(response_text: &str, grounding: &[GroundingChunk]) -> ParsedReply {
    let (before, profile, actions) = match split_first_fence(response_text) {
        Some(split) => (
            split.before,
            parse_profile(split.inner),
            strip_actions_heading(split.after),
        ),
        None => (response_text, None, String::new()),
    };

    let natural_reply = {
        let trimmed = before.trim();
        if trimmed.is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            trimmed.to_string()
        }
    };

    let status = DocumentStatus::from_profile(profile.as_ref());

    let sources: Vec<GroundingSource> = grounding
        .iter()
        .filter_map(|chunk| chunk.web.clone())
        .collect();
    let sources = if sources.is_empty() { None } else { Some(sources) };

    ParsedReply {
        natural_reply,
        profile,
        status,
        actions,
        sources,
    }
}

/// Display-side checklist filter: bullet lines from the actions text,
/// stripped of their leading `-`/`*` marker.
pub fn action_items(actions: &str) -> Vec<String> {
    actions
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || line.starts_with('*'))
        .map(|line| line[1..].trim_start().to_string())
        .collect()
}
