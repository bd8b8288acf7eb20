//! Interaction Responses

use serde::{Deserialize, Serialize};

/// Interaction callback type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ResponseType {
    /// Answer to a ping.
    Pong,
    /// Reply with a message.
    ChannelMessageWithSource,
    /// Acknowledge now, send a message later.
    DeferredChannelMessageWithSource,
    /// Acknowledge a component without changing the message.
    DeferredUpdateMessage,
    /// Edit the message the component is attached to.
    UpdateMessage,
    /// Autocomplete suggestions.
    AutocompleteResult,
    /// Open a modal.
    Modal,
    /// Unrecognised callback type.
    Unknown(u8),
}

impl From<u8> for ResponseType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Pong,
            4 => Self::ChannelMessageWithSource,
            5 => Self::DeferredChannelMessageWithSource,
            6 => Self::DeferredUpdateMessage,
            7 => Self::UpdateMessage,
            8 => Self::AutocompleteResult,
            9 => Self::Modal,
            other => Self::Unknown(other),
        }
    }
}

impl From<ResponseType> for u8 {
    fn from(kind: ResponseType) -> Self {
        match kind {
            ResponseType::Pong => 1,
            ResponseType::ChannelMessageWithSource => 4,
            ResponseType::DeferredChannelMessageWithSource => 5,
            ResponseType::DeferredUpdateMessage => 6,
            ResponseType::UpdateMessage => 7,
            ResponseType::AutocompleteResult => 8,
            ResponseType::Modal => 9,
            ResponseType::Unknown(other) => other,
        }
    }
}

/// Message flag: only the invoking user sees the reply.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// Message body of an interaction response or follow-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Text-to-speech flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    /// Rich embeds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<serde_json::Value>,
    /// Action rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<serde_json::Value>>,
    /// Message flags bitfield.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    /// Modal id (modal responses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Modal title (modal responses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ResponseData {
    /// Plain text reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Plain text reply visible only to the invoking user.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            flags: Some(EPHEMERAL_FLAG),
            ..Self::default()
        }
    }
}

/// A full interaction response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    /// Callback type.
    #[serde(rename = "type")]
    pub kind: ResponseType,
    /// Optional body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    /// A message reply.
    pub const fn message(data: ResponseData) -> Self {
        Self {
            kind: ResponseType::ChannelMessageWithSource,
            data: Some(data),
        }
    }

    /// An in-place update of the component's message.
    pub const fn update(data: ResponseData) -> Self {
        Self {
            kind: ResponseType::UpdateMessage,
            data: Some(data),
        }
    }

    /// A component acknowledgement with no visible change.
    pub const fn acknowledge() -> Self {
        Self {
            kind: ResponseType::DeferredUpdateMessage,
            data: None,
        }
    }
}

/// Value of an autocomplete or static option choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Integer(i64),
    Number(f64),
    String(String),
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A named option choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Label shown to the user.
    pub name: String,
    /// Value sent back when picked.
    pub value: ChoiceValue,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Autocomplete response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    /// Always [`ResponseType::AutocompleteResult`].
    #[serde(rename = "type")]
    pub kind: ResponseType,
    /// Suggestions.
    pub data: AutocompleteData,
}

/// Suggestions wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteData {
    pub choices: Vec<Choice>,
}

impl AutocompleteResponse {
    pub const fn new(choices: Vec<Choice>) -> Self {
        Self {
            kind: ResponseType::AutocompleteResult,
            data: AutocompleteData { choices },
        }
    }
}

/// Pre-encoded reply to a ping.
pub const PONG_BODY: &[u8] = br#"{"type":1}"#;

/// Pre-encoded component/modal acknowledgement.
pub const ACKNOWLEDGE_BODY: &[u8] = br#"{"type":6}"#;

/// Pre-encoded reply for commands the server does not know.
pub const UNKNOWN_COMMAND_BODY: &[u8] =
    br#"{"type":4,"data":{"content":"Unknown command. It may have been removed.","flags":64}}"#;
