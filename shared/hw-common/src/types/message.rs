//! Message Types

use serde::{Deserialize, Serialize};

use crate::Snowflake;

/// A channel message.
///
/// Embeds and components are kept as raw JSON: the server only forwards them.
/// `components` is deliberately serialized as `null` when unset; the REST
/// layer rewrites that into an empty list, which is how the API expects a
/// message's components to be cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID (absent on outgoing messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Snowflake>,
    /// Channel the message lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Snowflake>,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// Text-to-speech flag.
    #[serde(default)]
    pub tts: bool,
    /// Rich embeds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<serde_json::Value>,
    /// Action rows.
    #[serde(default)]
    pub components: Option<Vec<serde_json::Value>>,
    /// Message flags bitfield.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl Message {
    /// Plain text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_components_serialize_as_null() {
        let json = serde_json::to_string(&Message::text("hi")).unwrap();
        assert!(json.contains("\"components\":null"));
        assert!(!json.contains("\"id\""));
    }
}
