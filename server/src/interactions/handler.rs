//! Handler signatures and the task wrapper they run in.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use hw_common::{Choice, Interaction, ResponseData};
use tracing::error;

use super::context::{
    AutocompleteInteraction, CommandInteraction, ComponentInteraction, ModalInteraction,
};
use super::{Client, InteractionReply};

/// Runs a command after the interaction has been answered.
pub type CommandHandler = Arc<dyn Fn(CommandInteraction) -> BoxFuture<'static, ()> + Send + Sync>;

/// Produces suggestions while the request is open.
pub type AutocompleteHandler =
    Arc<dyn Fn(&AutocompleteInteraction) -> Vec<Choice> + Send + Sync>;

/// Answers a component interaction.
pub type ComponentHandler =
    Arc<dyn Fn(ComponentInteraction) -> BoxFuture<'static, InteractionReply> + Send + Sync>;

/// Answers a modal submission.
pub type ModalHandler =
    Arc<dyn Fn(ModalInteraction) -> BoxFuture<'static, InteractionReply> + Send + Sync>;

/// Runs before every command; `Some` answers the interaction in its place.
pub type PreCommandHandler =
    Arc<dyn Fn(&CommandInteraction) -> Option<ResponseData> + Send + Sync>;

/// Catch-all for interaction types nothing else handles.
pub type InteractionHandler =
    Arc<dyn Fn(Interaction, Arc<Client>) -> BoxFuture<'static, ()> + Send + Sync>;

pub fn command_handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(CommandInteraction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

pub fn component_handler<F, Fut>(f: F) -> ComponentHandler
where
    F: Fn(ComponentInteraction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InteractionReply> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

pub fn modal_handler<F, Fut>(f: F) -> ModalHandler
where
    F: Fn(ModalInteraction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InteractionReply> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

pub fn interaction_handler<F, Fut>(f: F) -> InteractionHandler
where
    F: Fn(Interaction, Arc<Client>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |interaction, client| Box::pin(f(interaction, client)))
}

/// Spawns a handler on its own task and logs if it panics.
pub(crate) fn spawn_logged<F>(kind: &'static str, name: String, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let handle = tokio::spawn(task);
        if let Err(e) = handle.await {
            error!(kind, name = %name, "Handler task panicked: {}", e);
        }
    });
}
