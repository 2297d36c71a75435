use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;

/// Fixed-width, lexically sortable form: `2024-01-01T10:00:00.000Z`.
/// Millisecond precision keeps file names derived from it sortable.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = time::macros::format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

pub mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn serialize<S: Serializer>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = dt
            .format(TIMESTAMP_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PrimitiveDateTime::parse(&raw, TIMESTAMP_FORMAT)
            .map(PrimitiveDateTime::assume_utc)
            .map_err(serde::de::Error::custom)
    }
}

pub fn format_timestamp(dt: OffsetDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT)
        .expect("static timestamp format")
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

// --- Conversation (the sole persisted entity) ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// An append-only exchange plus provenance metadata. `provider` and `model`
/// record what the conversation was *started* with; continuing under a
/// different provider only prints a warning and leaves them untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: OffsetDateTime,
    pub provider: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// The most recent user turn, if any.
    pub fn last_question(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

// --- Citation sources (Perplexity) ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Source {
    /// Display label: title when present, url otherwise.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or_default()
    }
}

// --- Single-shot JSON result record ---

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AskRecord {
    pub provider: String,
    pub model: String,
    pub question: String,
    pub response: String,
    pub conversation_id: String,
    pub message_count: usize,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

/// Builds the record for `--json` output. Must be called *before* the
/// assistant turn is appended: `message_count` counts the prior messages
/// plus the response itself.
pub fn build_ask_record(
    conversation: &Conversation,
    response: &str,
    sources: &[Source],
    duration_ms: u64,
) -> AskRecord {
    AskRecord {
        provider: conversation.provider.clone(),
        model: conversation.model.clone(),
        question: conversation.last_question().unwrap_or_default().to_string(),
        response: response.to_string(),
        conversation_id: conversation.id.clone(),
        message_count: conversation.messages.len() + 1,
        duration_ms,
        sources: if sources.is_empty() {
            None
        } else {
            Some(sources.to_vec())
        },
    }
}

// --- Model listing ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ModelEntry {
    pub fn detail(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.display_name.as_deref())
            .filter(|s| !s.is_empty())
    }
}
