//! Interaction Client
//!
//! The coordinator that owns every handler table and both wait queues.
//! Built once at startup through [`ClientBuilder`]; all tables are
//! read-only afterwards and shared behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use hw_common::{ApplicationCommandPayload, Interaction, ResponseData, Snowflake, User};
use tracing::info;

use super::commands::{Command, CommandRegistry, RegistryError};
use super::context::{CommandInteraction, ComponentInteraction, ModalInteraction};
use super::handler::{
    component_handler, interaction_handler, modal_handler, ComponentHandler, InteractionHandler,
    ModalHandler, PreCommandHandler,
};
use super::signature::{InteractionVerifier, SignatureError};
use super::wait_queue::{WaitOutcome, WaitQueue, WaitQueueError, DEFAULT_WAIT_CEILING};
use super::InteractionReply;
use crate::config::Config;
use crate::rest::{RestClient, RestError};

/// Collects handlers before the client is frozen.
pub struct ClientBuilder {
    rest: Arc<RestClient>,
    application_id: Snowflake,
    verifier: InteractionVerifier,
    commands: CommandRegistry,
    components: HashMap<String, ComponentHandler>,
    modals: HashMap<String, ModalHandler>,
    component_fallback: Option<ComponentHandler>,
    modal_fallback: Option<ModalHandler>,
    interaction_handler: Option<InteractionHandler>,
    pre_command: Option<PreCommandHandler>,
    wait_ceiling: Duration,
}

impl ClientBuilder {
    pub fn new(
        rest: impl Into<Arc<RestClient>>,
        application_id: Snowflake,
        verifier: InteractionVerifier,
    ) -> Self {
        Self {
            rest: rest.into(),
            application_id,
            verifier,
            commands: CommandRegistry::new(),
            components: HashMap::new(),
            modals: HashMap::new(),
            component_fallback: None,
            modal_fallback: None,
            interaction_handler: None,
            pre_command: None,
            wait_ceiling: DEFAULT_WAIT_CEILING,
        }
    }

    /// Builder seeded from server configuration. Fails on a malformed
    /// public key.
    pub fn from_config(config: &Config, rest: RestClient) -> Result<Self, SignatureError> {
        let verifier = InteractionVerifier::from_hex(&config.public_key)?;
        Ok(Self::new(rest, config.application_id, verifier)
            .wait_timeout_ceiling(config.wait_timeout_ceiling()))
    }

    pub fn register_command(mut self, command: Command) -> Result<Self, RegistryError> {
        self.commands.register(command)?;
        Ok(self)
    }

    pub fn register_subcommand(mut self, root: &str, command: Command) -> Result<Self, RegistryError> {
        self.commands.register_subcommand(root, command)?;
        Ok(self)
    }

    /// Permanent handler for a component id. It answers every interaction
    /// with that id, ahead of any armed wait.
    pub fn register_component<F, Fut>(
        mut self,
        custom_id: impl Into<String>,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(ComponentInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InteractionReply> + Send + 'static,
    {
        let custom_id = custom_id.into();
        if self.components.contains_key(&custom_id) {
            return Err(RegistryError::DuplicateComponent(custom_id));
        }
        self.components.insert(custom_id, component_handler(handler));
        Ok(self)
    }

    /// Permanent handler for a modal id.
    pub fn register_modal<F, Fut>(
        mut self,
        custom_id: impl Into<String>,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(ModalInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InteractionReply> + Send + 'static,
    {
        let custom_id = custom_id.into();
        if self.modals.contains_key(&custom_id) {
            return Err(RegistryError::DuplicateModal(custom_id));
        }
        self.modals.insert(custom_id, modal_handler(handler));
        Ok(self)
    }

    /// Answers components nothing else claimed.
    #[must_use]
    pub fn on_component<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(ComponentInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InteractionReply> + Send + 'static,
    {
        self.component_fallback = Some(component_handler(handler));
        self
    }

    /// Answers modals nothing else claimed.
    #[must_use]
    pub fn on_modal<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(ModalInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InteractionReply> + Send + 'static,
    {
        self.modal_fallback = Some(modal_handler(handler));
        self
    }

    /// Receives interaction types the router does not understand.
    #[must_use]
    pub fn on_interaction<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Interaction, Arc<Client>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.interaction_handler = Some(interaction_handler(handler));
        self
    }

    /// Runs before every command. Returning a payload answers the
    /// interaction with it and skips the command.
    #[must_use]
    pub fn before_command<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandInteraction) -> Option<ResponseData> + Send + Sync + 'static,
    {
        self.pre_command = Some(Arc::new(handler));
        self
    }

    /// Upper bound for armed wait timeouts.
    #[must_use]
    pub const fn wait_timeout_ceiling(mut self, ceiling: Duration) -> Self {
        self.wait_ceiling = ceiling;
        self
    }

    pub fn build(self) -> Arc<Client> {
        info!(
            commands = self.commands.len(),
            components = self.components.len(),
            modals = self.modals.len(),
            "Interaction client ready"
        );

        Arc::new(Client {
            rest: self.rest,
            application_id: self.application_id,
            verifier: self.verifier,
            commands: self.commands,
            components: self.components,
            modals: self.modals,
            component_fallback: self.component_fallback,
            modal_fallback: self.modal_fallback,
            interaction_handler: self.interaction_handler,
            pre_command: self.pre_command,
            component_waits: WaitQueue::new(self.wait_ceiling),
            modal_waits: WaitQueue::new(self.wait_ceiling),
            bot_user: OnceLock::new(),
        })
    }
}

/// Owns every handler table, both wait queues and the REST client.
pub struct Client {
    rest: Arc<RestClient>,
    application_id: Snowflake,
    verifier: InteractionVerifier,
    pub(crate) commands: CommandRegistry,
    pub(crate) components: HashMap<String, ComponentHandler>,
    pub(crate) modals: HashMap<String, ModalHandler>,
    pub(crate) component_fallback: Option<ComponentHandler>,
    pub(crate) modal_fallback: Option<ModalHandler>,
    pub(crate) interaction_handler: Option<InteractionHandler>,
    pub(crate) pre_command: Option<PreCommandHandler>,
    component_waits: WaitQueue<ComponentInteraction>,
    modal_waits: WaitQueue<ModalInteraction>,
    bot_user: OnceLock<User>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("application_id", &self.application_id)
            .field("commands", &self.commands.len())
            .field("components", &self.components.len())
            .field("modals", &self.modals.len())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub const fn application_id(&self) -> Snowflake {
        self.application_id
    }

    /// Checks an inbound request's signature headers against its body.
    pub fn verify(&self, signature: Option<&str>, timestamp: Option<&str>, body: &[u8]) -> bool {
        self.verifier.verify(signature, timestamp, body)
    }

    pub const fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub const fn component_waits(&self) -> &WaitQueue<ComponentInteraction> {
        &self.component_waits
    }

    pub const fn modal_waits(&self) -> &WaitQueue<ModalInteraction> {
        &self.modal_waits
    }

    /// Arms `handler` for the first click on any of `custom_ids`. The
    /// handler receives [`WaitOutcome::TimedOut`] if nobody clicks in time.
    pub fn arm_components<I, K, F>(
        &self,
        custom_ids: I,
        timeout: Duration,
        handler: F,
    ) -> Result<(), WaitQueueError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: FnOnce(WaitOutcome<ComponentInteraction>) + Send + 'static,
    {
        self.component_waits.arm(custom_ids, timeout, handler)
    }

    /// Waits for the first click on any of `custom_ids`.
    pub async fn await_components<I, K>(
        &self,
        custom_ids: I,
        timeout: Duration,
    ) -> Result<WaitOutcome<ComponentInteraction>, WaitQueueError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.component_waits.await_event(custom_ids, timeout).await
    }

    /// Waits for the modal with `custom_id` to be submitted.
    pub async fn await_modal(
        &self,
        custom_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<WaitOutcome<ModalInteraction>, WaitQueueError> {
        self.modal_waits.await_event([custom_id], timeout).await
    }

    /// Upload payloads for the registered commands.
    pub fn command_payloads(&self, whitelist: Option<&[String]>) -> Vec<ApplicationCommandPayload> {
        self.commands.payloads(whitelist)
    }

    /// Uploads the registered commands, replacing what the platform has.
    /// An empty guild list means a global upload.
    pub async fn sync_commands(
        &self,
        guild_ids: &[Snowflake],
        whitelist: Option<&[String]>,
    ) -> Result<(), RestError> {
        let payload = self.command_payloads(whitelist);

        if guild_ids.is_empty() {
            self.rest
                .bulk_overwrite_commands(self.application_id, None, &payload)
                .await?;
            info!(commands = payload.len(), "Synced global commands");
            return Ok(());
        }

        for guild_id in guild_ids {
            self.rest
                .bulk_overwrite_commands(self.application_id, Some(*guild_id), &payload)
                .await?;
            info!(guild_id = %guild_id, commands = payload.len(), "Synced guild commands");
        }
        Ok(())
    }

    /// Fetches the application's bot user and remembers it.
    pub async fn fetch_bot_user(&self) -> Result<&User, RestError> {
        if let Some(user) = self.bot_user.get() {
            return Ok(user);
        }
        let user = self.rest.fetch_user(self.application_id).await?;
        Ok(self.bot_user.get_or_init(|| user))
    }

    /// The bot user, once [`fetch_bot_user`](Self::fetch_bot_user) has run.
    pub fn bot_user(&self) -> Option<&User> {
        self.bot_user.get()
    }
}
