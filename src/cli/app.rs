//! The application root
//!
//! [`AppBuilder`] collects identity, switches, options and child commands;
//! [`AppBuilder::build`] flattens everything onto one clap root command. An
//! [`Application`] then parses, runs the option lifecycle and dispatches.

use crate::{
    cli::{
        args::{PositionalArgs, no_args},
        command::{Command, Node, positional},
        help::{self, HELP_COMMAND, help_command},
        output::exit_with_error,
    },
    core::{
        lifecycle::{Lifecycle, Settings},
        Capabilities, CliOptions, NoOptions, Stage, ValidationMode,
    },
    config::baseline,
    error::{AppError, Result},
    flag::{
        FlagSet, GLOBAL_GROUP, NamedFlagSets,
        builtin::{POSITIONAL_ARGS, config_flag, help_flag, positional_args, version_flag},
        normalize_args, word_sep_normalize,
    },
};
use clap::{
    Arg,
    error::{ContextKind, ContextValue, ErrorKind},
};
use figment::Figment;
use std::{collections::HashSet, ffi::OsString, fmt};
use tracing::{debug, instrument};

/// Callback run once the lifecycle has prepared the options
pub type RunFunc<O> = Box<dyn Fn(&str, &O) -> anyhow::Result<()>>;

/// Collects everything an [`Application`] is made of
pub struct AppBuilder<O: CliOptions = NoOptions> {
    name: String,
    short_desc: String,
    long_desc: Option<String>,
    version: Option<String>,
    options: O,
    run_func: Option<RunFunc<O>>,
    silence: bool,
    no_version: bool,
    no_config: bool,
    validation: ValidationMode,
    args: Option<PositionalArgs>,
    commands: Vec<Command>,
    global_flags: FlagSet,
}

impl AppBuilder<NoOptions> {
    fn new(name: impl Into<String>, short_desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_desc: short_desc.into(),
            long_desc: None,
            version: None,
            options: NoOptions::default(),
            run_func: None,
            silence: false,
            no_version: false,
            no_config: false,
            validation: ValidationMode::default(),
            args: None,
            commands: Vec::new(),
            global_flags: FlagSet::new(GLOBAL_GROUP),
        }
    }

    /// Attach the configuration object flags are bound into
    pub fn options<P: CliOptions>(self, options: P) -> AppBuilder<P> {
        let run_func = self.run_func.map(|run_func| -> RunFunc<P> {
            Box::new(move |name: &str, _: &P| run_func(name, &NoOptions {}))
        });
        AppBuilder {
            name: self.name,
            short_desc: self.short_desc,
            long_desc: self.long_desc,
            version: self.version,
            options,
            run_func,
            silence: self.silence,
            no_version: self.no_version,
            no_config: self.no_config,
            validation: self.validation,
            args: self.args,
            commands: self.commands,
            global_flags: self.global_flags,
        }
    }
}

impl<O: CliOptions> AppBuilder<O> {
    /// Callback receiving the application name
    #[must_use]
    pub fn run_func<F>(mut self, run_func: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<()> + 'static,
    {
        self.run_func = Some(Box::new(move |name: &str, _: &O| run_func(name)));
        self
    }

    /// Callback receiving the application name and the prepared options
    #[must_use]
    pub fn run_func_with_options<F>(mut self, run_func: F) -> Self
    where
        F: Fn(&str, &O) -> anyhow::Result<()> + 'static,
    {
        self.run_func = Some(Box::new(run_func));
        self
    }

    /// Long description shown by `--help`
    #[must_use]
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.long_desc = Some(desc.into());
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Suppress informational lifecycle output
    #[must_use]
    pub fn silence(mut self) -> Self {
        self.silence = true;
        self
    }

    #[must_use]
    pub fn no_version(mut self) -> Self {
        self.no_version = true;
        self
    }

    /// Skip the config file flag and flag binding
    #[must_use]
    pub fn no_config(mut self) -> Self {
        self.no_config = true;
        self
    }

    /// Keep running when validation reports errors, logging them instead
    #[must_use]
    pub fn lenient_validation(mut self) -> Self {
        self.validation = ValidationMode::Lenient;
        self
    }

    /// Validate positional arguments of the root command
    #[must_use]
    pub fn args(mut self, args: PositionalArgs) -> Self {
        self.args = Some(args);
        self
    }

    /// Reject any positional argument on the root command
    #[must_use]
    pub fn default_args(self) -> Self {
        self.args(no_args())
    }

    #[must_use]
    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    /// Process-wide flags to expose alongside the options' own flags
    #[must_use]
    pub fn global_flags(mut self, flags: &FlagSet) -> Self {
        self.global_flags.add_flag_set(flags);
        self
    }

    /// Flatten flags and commands onto the root and return a runnable application
    #[instrument(skip_all, fields(app = %self.name))]
    pub fn build(self) -> Result<Application<O>> {
        let mut command = clap::Command::new(self.name.clone())
            .bin_name(self.name.clone())
            .about(self.short_desc.clone())
            .disable_help_flag(true)
            .disable_help_subcommand(true)
            .disable_version_flag(true)
            // The root has many flags; list them alphabetically.
            .next_display_order(None);
        if let Some(long_desc) = &self.long_desc {
            command = command.long_about(long_desc.clone());
        }

        let children: Vec<Node> = self.commands.into_iter().map(Command::finalize).collect();
        if children.iter().any(|child| child.name() == HELP_COMMAND) {
            return Err(AppError::build(format!(
                "command name {HELP_COMMAND:?} is reserved"
            )));
        }

        let mut flag_sets = self.options.flags();
        let global = flag_sets.flag_set(GLOBAL_GROUP);
        global.add_flag_set(&self.global_flags);
        if !self.no_config {
            global.add(config_flag(&self.name));
        }
        if !self.no_version {
            if let Some(version) = &self.version {
                command = command.version(version.clone());
                global.add(version_flag());
            }
        }
        global.add(help_flag(&self.name));
        command = attach_flag_sets(command, &flag_sets)?;

        if self.args.is_some() || children.is_empty() {
            command = command.arg(positional_args());
        }
        if !children.is_empty() {
            for child in &children {
                command = command.subcommand(child.command().clone());
            }
            command = command
                .subcommand(help_command(&self.name))
                .args_conflicts_with_subcommands(true);
        }

        debug!(
            "Built {} with {} flag group(s) and {} command(s)",
            self.name,
            flag_sets.len(),
            children.len()
        );

        Ok(Application {
            name: self.name,
            version: self.version,
            silence: self.silence,
            no_version: self.no_version,
            no_config: self.no_config,
            validation: self.validation,
            capabilities: O::CAPABILITIES,
            baseline: baseline(&self.options),
            options: self.options,
            run_func: self.run_func,
            args: self.args,
            flag_groups: flag_sets.order().to_vec(),
            children,
            command,
            stage: Stage::Unparsed,
        })
    }
}

/// Add every group's flags to `command`, rejecting name collisions
fn attach_flag_sets(mut command: clap::Command, flag_sets: &NamedFlagSets) -> Result<clap::Command> {
    let mut ids = HashSet::new();
    let mut longs = HashSet::new();
    let mut shorts = HashSet::new();

    for set in flag_sets.iter() {
        for arg in set.args() {
            let mut arg = normalize_arg(arg.clone());
            let id = word_sep_normalize(arg.get_id().as_str()).into_owned();
            if id == POSITIONAL_ARGS {
                return Err(AppError::build(format!(
                    "flag name {id:?} in group {:?} is reserved",
                    set.name()
                )));
            }
            if !ids.insert(id.clone()) {
                return Err(AppError::build(format!(
                    "flag {id:?} in group {:?} is already defined",
                    set.name()
                )));
            }
            if let Some(long) = arg.get_long() {
                if !longs.insert(long.to_string()) {
                    return Err(AppError::build(format!(
                        "flag --{long} in group {:?} is already defined",
                        set.name()
                    )));
                }
            }
            if let Some(short) = arg.get_short() {
                if !shorts.insert(short) {
                    return Err(AppError::build(format!(
                        "shorthand -{short} for flag {id:?} is already in use"
                    )));
                }
            }
            if set.name() != GLOBAL_GROUP {
                arg = arg.help_heading(format!("{} flags", set.name()));
            }
            command = command.arg(arg);
        }
    }
    Ok(command)
}

fn normalize_arg(arg: Arg) -> Arg {
    let long = arg
        .get_long()
        .map(|long| word_sep_normalize(long).into_owned());
    match long {
        Some(long) => arg.long(long),
        None => arg,
    }
}

/// A built application, ready to parse and run
pub struct Application<O: CliOptions = NoOptions> {
    name: String,
    version: Option<String>,
    silence: bool,
    no_version: bool,
    no_config: bool,
    validation: ValidationMode,
    capabilities: Capabilities,
    baseline: Figment,
    options: O,
    run_func: Option<RunFunc<O>>,
    args: Option<PositionalArgs>,
    flag_groups: Vec<String>,
    children: Vec<Node>,
    command: clap::Command,
    stage: Stage,
}

impl Application<NoOptions> {
    pub fn builder(name: impl Into<String>, short_desc: impl Into<String>) -> AppBuilder<NoOptions> {
        AppBuilder::new(name, short_desc)
    }
}

impl<O: CliOptions> Application<O> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root clap command with every flag and subcommand attached
    pub fn command(&self) -> &clap::Command {
        &self.command
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The configuration object as left by the last invocation
    pub fn options(&self) -> &O {
        &self.options
    }

    /// Flag group names in registration order
    pub fn flag_groups(&self) -> &[String] {
        &self.flag_groups
    }

    /// The last lifecycle stage reached
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run with the process arguments, exiting with status 1 on failure
    pub fn execute(&mut self) {
        self.execute_from(std::env::args_os());
    }

    /// Run with `args`, exiting with status 1 on failure
    pub fn execute_from<I, T>(&mut self, args: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        if let Err(err) = self.try_execute_from(args) {
            exit_with_error(&err);
        }
    }

    /// Parse `args`, run the lifecycle and dispatch, returning the outcome
    pub fn try_execute_from<I, T>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.stage = Stage::Unparsed;
        let typed: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let outcome = self
            .dispatch(normalize_args(typed.iter().cloned()))
            .map_err(|err| match err {
                AppError::Parse(err) => AppError::Parse(restore_typed_flag(err, &typed)),
                other => other,
            });
        if outcome.is_err() {
            self.stage = Stage::Failed;
        }
        outcome
    }

    #[instrument(skip_all, fields(app = %self.name))]
    fn dispatch(&mut self, args: Vec<OsString>) -> Result<()> {
        let mut root = self.command.clone();
        let matches = match root.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.print()?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        self.stage = Stage::Parsed;
        // Fill in full bin names so help for any node shows its whole path.
        root.build();

        match matches.subcommand() {
            Some((HELP_COMMAND, sub_matches)) => help::run(&root, sub_matches),
            Some((name, sub_matches)) => {
                let child = self
                    .children
                    .iter()
                    .find(|child| child.name() == name)
                    .ok_or_else(|| AppError::build(format!("no node for subcommand {name}")))?;
                let built = root
                    .find_subcommand(name)
                    .ok_or_else(|| AppError::build(format!("no command for subcommand {name}")))?;
                child.dispatch(built, sub_matches)?;
                self.stage = Stage::Executed;
                Ok(())
            }
            None => self.run_root(&root, &matches),
        }
    }

    fn run_root(&mut self, root: &clap::Command, matches: &clap::ArgMatches) -> Result<()> {
        if let Some(validate_args) = &self.args {
            validate_args(&self.name, &positional(matches))?;
        }

        let Some(run_func) = &self.run_func else {
            debug!("{} has no run callback, printing help", self.name);
            root.clone().print_help()?;
            return Ok(());
        };

        let settings = Settings {
            name: &self.name,
            version: self.version.as_deref(),
            silence: self.silence,
            no_version: self.no_version,
            no_config: self.no_config,
            validation: self.validation,
            capabilities: self.capabilities,
            baseline: &self.baseline,
        };
        let mut lifecycle = Lifecycle::new(settings);
        let name = &self.name;
        let outcome = lifecycle.run(&mut self.options, root, matches, |options| {
            run_func(name, options).map_err(AppError::Callback)
        });
        let stage = lifecycle.stage();
        self.stage = stage;
        outcome
    }
}

/// Report an unknown flag the way it was typed rather than normalized
fn restore_typed_flag(mut err: clap::Error, typed: &[OsString]) -> clap::Error {
    let Some(ContextValue::String(invalid)) = err.get(ContextKind::InvalidArg) else {
        return err;
    };
    let invalid = invalid.clone();
    let original = typed
        .iter()
        .filter_map(|arg| arg.to_str())
        .find_map(|arg| {
            let name = arg.split_once('=').map_or(arg, |(name, _)| name);
            [arg, name]
                .into_iter()
                .find(|token| *token != invalid && word_sep_normalize(token) == invalid.as_str())
        })
        .map(str::to_string);
    if let Some(original) = original {
        err.insert(ContextKind::InvalidArg, ContextValue::String(original));
    }
    err
}

impl<O: CliOptions> fmt::Debug for Application<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("flag_groups", &self.flag_groups)
            .field("children", &self.children)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
