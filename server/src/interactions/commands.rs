//! Command Registry
//!
//! Commands are registered once while the client is being built and are
//! read-only afterwards. A root command may carry subcommands; an invocation
//! names the subcommand as its first option.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use hw_common::{
    ApplicationCommandPayload, Choice, CommandOption, InteractionData, InteractionOption,
    OptionType,
};
use thiserror::Error;

use super::context::{AutocompleteInteraction, CommandInteraction};
use super::handler::{command_handler, AutocompleteHandler, CommandHandler};

/// Chat-input command type in the upload payload.
const CHAT_INPUT: u8 = 1;

/// Errors raised while registering handlers. All of them are startup bugs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command {0:?} is already registered")]
    DuplicateCommand(String),
    #[error("Cannot add a subcommand to unregistered command {0:?}")]
    UnknownRoot(String),
    #[error("Subcommand {sub:?} of {root:?} is already registered")]
    DuplicateSubcommand { root: String, sub: String },
    #[error("A component handler for {0:?} is already registered")]
    DuplicateComponent(String),
    #[error("A modal handler for {0:?} is already registered")]
    DuplicateModal(String),
    #[error("Command name {0:?} must be 1-32 characters of lowercase letters, digits, '-' or '_'")]
    InvalidName(String),
    #[error("Description of {0:?} must be 1-100 characters")]
    InvalidDescription(String),
}

/// Root name plus optional subcommand name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandPath {
    pub root: String,
    pub sub: Option<String>,
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{} {}", self.root, sub),
            None => f.write_str(&self.root),
        }
    }
}

/// A registered command or subcommand.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    options: Vec<CommandOption>,
    available_in_dm: bool,
    handler: CommandHandler,
    autocomplete: Option<AutocompleteHandler>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("available_in_dm", &self.available_in_dm)
            .field("autocomplete", &self.autocomplete.is_some())
            .finish_non_exhaustive()
    }
}

impl Command {
    /// A guild-only command running `handler` after the interaction is
    /// acknowledged.
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CommandInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            available_in_dm: false,
            handler: command_handler(handler),
            autocomplete: None,
        }
    }

    #[must_use]
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Allow the command in direct messages.
    #[must_use]
    pub const fn allow_dm(mut self) -> Self {
        self.available_in_dm = true;
        self
    }

    /// Attach an autocomplete handler.
    #[must_use]
    pub fn autocomplete<F>(mut self, handler: F) -> Self
    where
        F: Fn(&AutocompleteInteraction) -> Vec<Choice> + Send + Sync + 'static,
    {
        self.autocomplete = Some(Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    pub const fn available_in_dm(&self) -> bool {
        self.available_in_dm
    }

    pub(crate) const fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    pub(crate) const fn autocomplete_handler(&self) -> Option<&AutocompleteHandler> {
        self.autocomplete.as_ref()
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let name_ok = !self.name.is_empty()
            && self.name.len() <= 32
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !name_ok {
            return Err(RegistryError::InvalidName(self.name.clone()));
        }
        if self.description.is_empty() || self.description.chars().count() > 100 {
            return Err(RegistryError::InvalidDescription(self.name.clone()));
        }
        Ok(())
    }
}

/// A command matched against an invocation.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub command: Arc<Command>,
    pub path: CommandPath,
    /// Options of the innermost command (the subcommand's, when there is one).
    pub options: Vec<InteractionOption>,
}

/// Root name → (subcommand name or `None` for the root itself) → command.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, HashMap<Option<String>, Arc<Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a root command.
    pub fn register(&mut self, command: Command) -> Result<(), RegistryError> {
        command.validate()?;
        if self.commands.contains_key(&command.name) {
            return Err(RegistryError::DuplicateCommand(command.name));
        }
        let mut entry = HashMap::new();
        let name = command.name.clone();
        entry.insert(None, Arc::new(command));
        self.commands.insert(name, entry);
        Ok(())
    }

    /// Registers `command` as a subcommand of the already registered `root`.
    pub fn register_subcommand(&mut self, root: &str, command: Command) -> Result<(), RegistryError> {
        command.validate()?;
        let Some(entry) = self.commands.get_mut(root) else {
            return Err(RegistryError::UnknownRoot(root.to_string()));
        };
        let key = Some(command.name.clone());
        if entry.contains_key(&key) {
            return Err(RegistryError::DuplicateSubcommand {
                root: root.to_string(),
                sub: command.name,
            });
        }
        entry.insert(key, Arc::new(command));
        Ok(())
    }

    /// Number of root commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Looks up the command an invocation names, descending one level when
    /// the first option is a subcommand.
    pub fn resolve(&self, data: &InteractionData) -> Option<ResolvedCommand> {
        let entry = self.commands.get(&data.name)?;

        let (sub, options) = match data.options.first() {
            Some(first) if first.kind == OptionType::SubCommand => {
                (Some(first.name.clone()), first.options.clone())
            }
            _ => (None, data.options.clone()),
        };

        let command = Arc::clone(entry.get(&sub)?);
        Some(ResolvedCommand {
            command,
            path: CommandPath {
                root: data.name.clone(),
                sub,
            },
            options,
        })
    }

    /// Upload payloads for every root command, sorted by name. When a
    /// whitelist is given only the named roots are included.
    pub fn payloads(&self, whitelist: Option<&[String]>) -> Vec<ApplicationCommandPayload> {
        let mut payloads: Vec<_> = self
            .commands
            .iter()
            .filter(|(name, _)| whitelist.is_none_or(|names| names.contains(*name)))
            .filter_map(|(_, entry)| {
                let root = entry.get(&None)?;
                let mut subs: Vec<_> = entry
                    .iter()
                    .filter_map(|(sub, command)| sub.as_ref().map(|_| command))
                    .collect();
                subs.sort_by(|a, b| a.name.cmp(&b.name));

                let mut options = root.options.clone();
                options.extend(subs.into_iter().map(|sub| {
                    let mut option =
                        CommandOption::new(OptionType::SubCommand, &sub.name, &sub.description);
                    option.options = sub.options.clone();
                    option
                }));

                Some(ApplicationCommandPayload {
                    name: root.name.clone(),
                    description: root.description.clone(),
                    kind: CHAT_INPUT,
                    options,
                    dm_permission: root.available_in_dm,
                })
            })
            .collect();
        payloads.sort_by(|a, b| a.name.cmp(&b.name));
        payloads
    }
}
