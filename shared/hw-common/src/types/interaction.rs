//! Interaction Envelope
//!
//! Inbound webhook payloads. Only the fields the dispatcher inspects are
//! typed; everything else stays opaque.

use serde::{Deserialize, Serialize};

use crate::{Member, Snowflake, User};

/// Interaction type, carried in the envelope's numeric `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionKind {
    /// Endpoint health check sent by the platform.
    Ping,
    /// Slash command invocation.
    ApplicationCommand,
    /// Button click or select menu choice.
    MessageComponent,
    /// Autocomplete request for a command option.
    Autocomplete,
    /// Modal form submission.
    ModalSubmit,
    /// Any type this server does not know about.
    Unknown(u8),
}

impl From<u8> for InteractionKind {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            other => Self::Unknown(other),
        }
    }
}

impl From<InteractionKind> for u8 {
    fn from(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Ping => 1,
            InteractionKind::ApplicationCommand => 2,
            InteractionKind::MessageComponent => 3,
            InteractionKind::Autocomplete => 4,
            InteractionKind::ModalSubmit => 5,
            InteractionKind::Unknown(other) => other,
        }
    }
}

/// Command option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum OptionType {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
    Unknown(u8),
}

impl From<u8> for OptionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::SubCommand,
            2 => Self::SubCommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            other => Self::Unknown(other),
        }
    }
}

impl From<OptionType> for u8 {
    fn from(kind: OptionType) -> Self {
        match kind {
            OptionType::SubCommand => 1,
            OptionType::SubCommandGroup => 2,
            OptionType::String => 3,
            OptionType::Integer => 4,
            OptionType::Boolean => 5,
            OptionType::User => 6,
            OptionType::Channel => 7,
            OptionType::Role => 8,
            OptionType::Mentionable => 9,
            OptionType::Number => 10,
            OptionType::Attachment => 11,
            OptionType::Unknown(other) => other,
        }
    }
}

/// An option value as received in a command or autocomplete interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOption {
    /// Option name.
    pub name: String,
    /// Option type.
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Supplied value (absent for subcommands).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Nested options (subcommands only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<InteractionOption>,
    /// Set on the option the user is typing into (autocomplete only).
    #[serde(default)]
    pub focused: bool,
}

impl InteractionOption {
    /// String value, if this option carries one.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(serde_json::Value::as_str)
    }

    /// Integer value, if this option carries one.
    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_ref().and_then(serde_json::Value::as_i64)
    }

    /// Boolean value, if this option carries one.
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_ref().and_then(serde_json::Value::as_bool)
    }
}

/// The `data` object of an interaction. Which fields are populated depends
/// on the interaction type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionData {
    /// Command name (commands and autocomplete).
    #[serde(default)]
    pub name: String,
    /// Command options (commands and autocomplete).
    #[serde(default)]
    pub options: Vec<InteractionOption>,
    /// Developer-defined component or modal id.
    #[serde(default)]
    pub custom_id: String,
    /// Component type (components only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<u8>,
    /// Selected values (select menus only).
    #[serde(default)]
    pub values: Vec<String>,
    /// Submitted action rows (modals only).
    #[serde(default)]
    pub components: Vec<serde_json::Value>,
}

/// An inbound interaction envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction ID.
    pub id: Snowflake,
    /// Application the interaction is for.
    pub application_id: Snowflake,
    /// Interaction type.
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    /// Type-specific payload (absent on pings).
    #[serde(default)]
    pub data: InteractionData,
    /// Guild the interaction came from; absent in direct messages.
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    /// Channel the interaction came from.
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    /// Invoking member (guild interactions).
    #[serde(default)]
    pub member: Option<Member>,
    /// Invoking user (direct-message interactions).
    #[serde(default)]
    pub user: Option<User>,
    /// Continuation token for follow-up calls.
    #[serde(default)]
    pub token: String,
    /// Envelope version.
    #[serde(default)]
    pub version: u8,
    /// Invoking user's locale.
    #[serde(default)]
    pub locale: Option<String>,
}

impl Interaction {
    /// Whether the interaction was sent from a direct message.
    pub const fn is_dm(&self) -> bool {
        self.guild_id.is_none()
    }

    /// The invoking user, wherever the platform put it.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }
}
