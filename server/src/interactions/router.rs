//! Interaction Router
//!
//! One pass per request: parse the envelope, classify it, and produce the
//! single reply. Command handlers run on their own task after the reply;
//! component and modal handlers answer inline.

use std::sync::Arc;

use hw_common::{AutocompleteResponse, Interaction, InteractionKind, InteractionResponse};
use tracing::{debug, warn};

use super::context::{
    AutocompleteInteraction, CommandInteraction, ComponentInteraction, ModalInteraction,
};
use super::handler::spawn_logged;
use super::wait_queue::WaitOutcome;
use super::{Client, InteractionError, InteractionReply};

impl Client {
    /// Routes a verified request body and returns the reply to write.
    ///
    /// The caller must have checked the signature already.
    #[tracing::instrument(skip_all)]
    pub async fn dispatch(
        self: &Arc<Self>,
        body: &[u8],
    ) -> Result<InteractionReply, InteractionError> {
        let interaction: Interaction = serde_json::from_slice(body)?;
        debug!(
            id = %interaction.id,
            kind = ?interaction.kind,
            guild_id = ?interaction.guild_id,
            "Dispatching interaction"
        );

        let interaction = Arc::new(interaction);
        let reply = match interaction.kind {
            InteractionKind::Ping => InteractionReply::pong(),
            InteractionKind::ApplicationCommand => self.dispatch_command(interaction),
            InteractionKind::MessageComponent => self.dispatch_component(interaction).await,
            InteractionKind::Autocomplete => self.dispatch_autocomplete(interaction),
            InteractionKind::ModalSubmit => self.dispatch_modal(interaction).await,
            InteractionKind::Unknown(kind) => self.dispatch_unknown(interaction, kind),
        };
        Ok(reply)
    }

    fn dispatch_command(self: &Arc<Self>, interaction: Arc<Interaction>) -> InteractionReply {
        let Some(resolved) = self.commands.resolve(&interaction.data) else {
            warn!(name = %interaction.data.name, "Unknown command invoked");
            return InteractionReply::unknown_command();
        };

        if interaction.is_dm() && !resolved.command.available_in_dm() {
            debug!(command = %resolved.path, "Guild-only command used in a direct message");
            return InteractionReply::NoContent;
        }

        let ctx = CommandInteraction::new(interaction, &resolved, Arc::clone(self));

        if let Some(pre_command) = &self.pre_command {
            if let Some(data) = pre_command(&ctx) {
                debug!(command = %resolved.path, "Pre-command handler answered");
                return InteractionReply::json_or_abort(
                    "pre-command response",
                    &InteractionResponse::message(data),
                );
            }
        }

        let task = (resolved.command.handler())(ctx);
        spawn_logged("command", resolved.path.to_string(), task);
        InteractionReply::NoContent
    }

    async fn dispatch_component(self: &Arc<Self>, interaction: Arc<Interaction>) -> InteractionReply {
        let key = interaction.data.custom_id.clone();
        let ctx = ComponentInteraction::new(interaction, Arc::clone(self));

        if let Some(handler) = self.components.get(&key) {
            return handler(ctx).await;
        }

        if let Some(pending) = self.component_waits().take(&key) {
            debug!(custom_id = %key, "Component delivered to armed wait");
            spawn_logged("component wait", key, async move {
                pending.fire(WaitOutcome::Delivered(ctx));
            });
            return InteractionReply::acknowledge();
        }

        match &self.component_fallback {
            Some(fallback) => fallback(ctx).await,
            None => {
                debug!(custom_id = %key, "No handler for component");
                InteractionReply::NoContent
            }
        }
    }

    fn dispatch_autocomplete(self: &Arc<Self>, interaction: Arc<Interaction>) -> InteractionReply {
        let Some(resolved) = self.commands.resolve(&interaction.data) else {
            return InteractionReply::NoContent;
        };
        let Some(handler) = resolved.command.autocomplete_handler() else {
            return InteractionReply::NoContent;
        };
        if resolved.command.options().is_empty() {
            return InteractionReply::NoContent;
        }

        let ctx = AutocompleteInteraction::new(CommandInteraction::new(
            interaction,
            &resolved,
            Arc::clone(self),
        ));
        let choices = handler(&ctx);
        InteractionReply::json_or_abort("autocomplete choices", &AutocompleteResponse::new(choices))
    }

    async fn dispatch_modal(self: &Arc<Self>, interaction: Arc<Interaction>) -> InteractionReply {
        let key = interaction.data.custom_id.clone();
        let ctx = ModalInteraction::new(interaction, Arc::clone(self));

        if let Some(handler) = self.modals.get(&key) {
            return handler(ctx).await;
        }

        if let Some(pending) = self.modal_waits().take(&key) {
            debug!(custom_id = %key, "Modal delivered to armed wait");
            spawn_logged("modal wait", key, async move {
                pending.fire(WaitOutcome::Delivered(ctx));
            });
            return InteractionReply::acknowledge();
        }

        match &self.modal_fallback {
            Some(fallback) => fallback(ctx).await,
            None => {
                debug!(custom_id = %key, "No handler for modal");
                InteractionReply::NoContent
            }
        }
    }

    fn dispatch_unknown(self: &Arc<Self>, interaction: Arc<Interaction>, kind: u8) -> InteractionReply {
        match &self.interaction_handler {
            Some(handler) => {
                let task = handler(Arc::unwrap_or_clone(interaction), Arc::clone(self));
                spawn_logged("interaction", format!("type {kind}"), task);
            }
            None => warn!(kind, "Unhandled interaction type"),
        }
        InteractionReply::NoContent
    }
}
