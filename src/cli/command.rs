//! Command tree composition
//!
//! A [`Command`] is a mutable description; [`Command::finalize`] consumes it and
//! its whole subtree into [`Node`]s that pair each clap command with its run
//! callback.

use crate::{
    error::{AppError, Result},
    flag::builtin::{POSITIONAL_ARGS, help_flag, positional_args},
};
use clap::ArgMatches;
use std::fmt;
use tracing::{debug, instrument};

/// Callback run when a command is invoked with no further subcommand
pub type CommandRunFunc = Box<dyn Fn(&[String]) -> anyhow::Result<()>>;

/// A named, invokable command with optional children
pub struct Command {
    usage: String,
    short: String,
    commands: Vec<Command>,
    run_func: Option<CommandRunFunc>,
}

impl Command {
    /// Create a command; the first word of `usage` is the invocation token
    pub fn new(usage: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            short: short.into(),
            commands: Vec::new(),
            run_func: None,
        }
    }

    /// Set the callback run with the positional arguments
    #[must_use]
    pub fn with_run_func<F>(mut self, run_func: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<()> + 'static,
    {
        self.run_func = Some(Box::new(run_func));
        self
    }

    pub fn name(&self) -> &str {
        self.usage.split_whitespace().next().unwrap_or_default()
    }

    pub fn short(&self) -> &str {
        &self.short
    }

    /// Append one child; sibling names are not de-duplicated
    pub fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Append children in order
    pub fn add_commands(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.extend(commands);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Convert this command and its subtree into invocable nodes
    pub fn finalize(self) -> Node {
        let name = self.name().to_string();
        let children: Vec<Node> = self.commands.into_iter().map(Command::finalize).collect();

        // Subcommands keep their flags in declaration order.
        let mut command = clap::Command::new(name.clone())
            .about(self.short)
            .disable_help_flag(true)
            .disable_help_subcommand(true)
            .disable_version_flag(true);
        for child in &children {
            command = command.subcommand(child.command.clone());
        }
        if !children.is_empty() {
            command = command.args_conflicts_with_subcommands(true);
        }
        command = command.arg(positional_args()).arg(help_flag(&name));

        Node {
            command,
            run_func: self.run_func,
            children,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("usage", &self.usage)
            .field("short", &self.short)
            .field("commands", &self.commands)
            .field("runnable", &self.run_func.is_some())
            .finish()
    }
}

/// The invocable form of a [`Command`]
pub struct Node {
    command: clap::Command,
    run_func: Option<CommandRunFunc>,
    children: Vec<Node>,
}

impl Node {
    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    /// The clap command this node parses with, subcommands attached
    pub fn command(&self) -> &clap::Command {
        &self.command
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_runnable(&self) -> bool {
        self.run_func.is_some()
    }

    /// Number of nodes in this subtree, this one included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Route `matches` down the tree and run the node it ends at
    ///
    /// `built` is this node's command as found in the built root, so help output
    /// carries the full command path.
    #[instrument(skip_all, fields(command = self.name()))]
    pub(crate) fn dispatch(&self, built: &clap::Command, matches: &ArgMatches) -> Result<()> {
        if let Some((name, sub_matches)) = matches.subcommand() {
            let child = self
                .children
                .iter()
                .find(|child| child.name() == name)
                .ok_or_else(|| AppError::build(format!("no node for subcommand {name}")))?;
            let sub_built = built
                .find_subcommand(name)
                .ok_or_else(|| AppError::build(format!("no command for subcommand {name}")))?;
            return child.dispatch(sub_built, sub_matches);
        }

        match &self.run_func {
            Some(run_func) => {
                let args = positional(matches);
                debug!("Running {} with {:?}", self.name(), args);
                run_func(&args).map_err(AppError::Callback)
            }
            None => {
                debug!("{} is not runnable, printing help", self.name());
                built.clone().print_help()?;
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("children", &self.children)
            .field("runnable", &self.is_runnable())
            .finish()
    }
}

/// Positional arguments left over after flag parsing
pub(crate) fn positional(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>(POSITIONAL_ARGS)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
