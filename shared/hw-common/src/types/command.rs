//! Command Definitions
//!
//! Shapes uploaded to the platform when syncing slash commands.

use serde::{Deserialize, Serialize};

use crate::{Choice, OptionType};

/// Option definition of a registered command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    /// Option type.
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Option name.
    pub name: String,
    /// Option description.
    pub description: String,
    /// Whether the option must be supplied.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Fixed choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Nested options (subcommands).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    /// Whether the option asks the server for autocomplete suggestions.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
}

impl CommandOption {
    /// A basic option of the given type.
    pub fn new(kind: OptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            options: Vec::new(),
            autocomplete: false,
        }
    }

    /// Mark the option as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the option as autocompleted.
    #[must_use]
    pub const fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }
}

/// Application command payload for the bulk overwrite endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCommandPayload {
    /// Command name.
    pub name: String,
    /// Command description.
    pub description: String,
    /// Command type (1 = chat input).
    #[serde(rename = "type")]
    pub kind: u8,
    /// Options, including subcommands.
    #[serde(default)]
    pub options: Vec<CommandOption>,
    /// Whether the command may be used in direct messages.
    pub dm_permission: bool,
}
