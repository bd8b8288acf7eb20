//! Handler-facing views over a parsed interaction.
//!
//! Each context pairs the interaction with the client so handlers can make
//! follow-up calls. Replies are returned as values; a context never writes
//! to the HTTP response itself.

use std::ops::Deref;
use std::sync::Arc;

use hw_common::{Interaction, InteractionOption, Message, ResponseData, Snowflake, User};

use super::commands::{CommandPath, ResolvedCommand};
use super::{Client, InteractionReply};
use crate::rest::{RestClient, RestError};

/// A resolved command invocation.
#[derive(Debug, Clone)]
pub struct CommandInteraction {
    interaction: Arc<Interaction>,
    path: CommandPath,
    options: Vec<InteractionOption>,
    client: Arc<Client>,
}

impl CommandInteraction {
    pub(crate) fn new(
        interaction: Arc<Interaction>,
        resolved: &ResolvedCommand,
        client: Arc<Client>,
    ) -> Self {
        Self {
            interaction,
            path: resolved.path.clone(),
            options: resolved.options.clone(),
            client,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub const fn path(&self) -> &CommandPath {
        &self.path
    }

    /// Root command name.
    pub fn name(&self) -> &str {
        &self.path.root
    }

    pub fn subcommand_name(&self) -> Option<&str> {
        self.path.sub.as_deref()
    }

    /// Options of the invoked command, or of the subcommand when one was used.
    pub fn options(&self) -> &[InteractionOption] {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&InteractionOption> {
        self.options.iter().find(|option| option.name == name)
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.interaction.guild_id
    }

    pub fn channel_id(&self) -> Option<Snowflake> {
        self.interaction.channel_id
    }

    pub fn user(&self) -> Option<&User> {
        self.interaction.invoker()
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        self.user().map(|user| user.id)
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn rest(&self) -> &RestClient {
        self.client.rest()
    }

    /// Sends a follow-up message. The interaction token stays valid for
    /// 15 minutes after the interaction arrived.
    pub async fn send_followup(&self, data: &ResponseData) -> Result<Message, RestError> {
        send_followup(&self.client, &self.interaction, data).await
    }

    /// Replaces the original response.
    pub async fn edit_original(&self, data: &ResponseData) -> Result<(), RestError> {
        self.client
            .rest()
            .edit_original_response(self.client.application_id(), &self.interaction.token, data)
            .await
    }
}

/// An autocomplete request for a resolved command.
#[derive(Debug, Clone)]
pub struct AutocompleteInteraction(CommandInteraction);

impl AutocompleteInteraction {
    pub(crate) const fn new(inner: CommandInteraction) -> Self {
        Self(inner)
    }

    /// The option the user is currently typing into.
    pub fn focused(&self) -> Option<&InteractionOption> {
        self.0.options.iter().find(|option| option.focused)
    }

    /// What the user has typed so far into the focused option.
    pub fn focused_value(&self) -> Option<&str> {
        self.focused().and_then(InteractionOption::as_str)
    }
}

impl Deref for AutocompleteInteraction {
    type Target = CommandInteraction;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A button press or select-menu choice.
#[derive(Debug, Clone)]
pub struct ComponentInteraction {
    interaction: Arc<Interaction>,
    client: Arc<Client>,
}

impl ComponentInteraction {
    pub(crate) const fn new(interaction: Arc<Interaction>, client: Arc<Client>) -> Self {
        Self {
            interaction,
            client,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Correlation key of the component.
    pub fn custom_id(&self) -> &str {
        &self.interaction.data.custom_id
    }

    /// Selected values (select menus only).
    pub fn values(&self) -> &[String] {
        &self.interaction.data.values
    }

    pub fn component_type(&self) -> Option<u8> {
        self.interaction.data.component_type
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.interaction.guild_id
    }

    pub fn channel_id(&self) -> Option<Snowflake> {
        self.interaction.channel_id
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        self.interaction.invoker().map(|user| user.id)
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Answers with a new message.
    pub fn reply(&self, data: ResponseData) -> InteractionReply {
        InteractionReply::message(data)
    }

    /// Answers by editing the message the component is attached to.
    pub fn update_message(&self, data: ResponseData) -> InteractionReply {
        InteractionReply::update(data)
    }

    pub const fn acknowledge(&self) -> InteractionReply {
        InteractionReply::acknowledge()
    }

    pub async fn send_followup(&self, data: &ResponseData) -> Result<Message, RestError> {
        send_followup(&self.client, &self.interaction, data).await
    }
}

/// A submitted modal.
#[derive(Debug, Clone)]
pub struct ModalInteraction {
    interaction: Arc<Interaction>,
    client: Arc<Client>,
}

impl ModalInteraction {
    pub(crate) const fn new(interaction: Arc<Interaction>, client: Arc<Client>) -> Self {
        Self {
            interaction,
            client,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Correlation key of the modal.
    pub fn custom_id(&self) -> &str {
        &self.interaction.data.custom_id
    }

    /// Every submitted `(custom_id, value)` pair, in row order.
    pub fn fields(&self) -> Vec<(&str, &str)> {
        self.interaction
            .data
            .components
            .iter()
            .filter_map(|row| row.get("components")?.as_array())
            .flatten()
            .filter_map(|input| {
                let id = input.get("custom_id")?.as_str()?;
                let value = input.get("value")?.as_str()?;
                Some((id, value))
            })
            .collect()
    }

    /// Value of the text input with the given id.
    pub fn field_value(&self, custom_id: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find_map(|(id, value)| (id == custom_id).then_some(value))
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        self.interaction.invoker().map(|user| user.id)
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn reply(&self, data: ResponseData) -> InteractionReply {
        InteractionReply::message(data)
    }

    pub const fn acknowledge(&self) -> InteractionReply {
        InteractionReply::acknowledge()
    }

    pub async fn send_followup(&self, data: &ResponseData) -> Result<Message, RestError> {
        send_followup(&self.client, &self.interaction, data).await
    }
}

async fn send_followup(
    client: &Client,
    interaction: &Interaction,
    data: &ResponseData,
) -> Result<Message, RestError> {
    client
        .rest()
        .create_followup(client.application_id(), &interaction.token, data)
        .await
}
